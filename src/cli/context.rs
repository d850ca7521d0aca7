//! Command execution context
//!
//! Loads configuration, opens token storage, builds the API client and
//! restores the session, so command handlers start from a settled session.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::OpenStockClient;
use crate::config::Config;
use crate::error::Result;
use crate::guard::{GuardKind, GuardView, Navigator, Route, RouteGuard};
use crate::notify::{Notifier, TerminalNotifier, Toast, ToastLevel};
use crate::session::Session;
use crate::storage::{SqliteStorage, TokenStore};

/// Context for command execution containing config, session, and output options.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Restored session; its client carries the bearer token
    pub session: Arc<Session>,
    /// Output format preference
    pub format: OutputFormat,
    /// Where command results and session warnings are shown
    pub notifier: Arc<TerminalNotifier>,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// # Errors
    /// Returns error if config is invalid or token storage cannot be opened.
    /// Backend failures during restoration end in an anonymous session
    /// instead.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?.with_api_url(opts.api_url_ref());
        config.validate()?;

        let storage = match config.storage_path.as_deref() {
            Some(path) => SqliteStorage::open_at(path)?,
            None => SqliteStorage::open()?,
        };
        debug!("Using API at {}", config.api_base_url);

        let store = TokenStore::new(Arc::new(storage), config.token_storage_key.clone());
        let client = Arc::new(OpenStockClient::new(&config, store)?);

        let spinner = restoring_spinner();
        let session = Session::start(client).await;
        spinner.finish_and_clear();

        Ok(Self {
            config,
            session: session?,
            format: opts.format,
            notifier: Arc::new(TerminalNotifier::new()),
        })
    }

    pub fn client(&self) -> &OpenStockClient {
        self.session.client()
    }

    /// Report the outcome of a command
    pub fn notify(&self, id: &str, level: ToastLevel, message: impl Into<String>) {
        self.notifier.show(Toast::new(id, level, message));
    }

    /// Evaluate a route guard for the current session.
    ///
    /// Returns `true` when the command may proceed. Otherwise the redirect
    /// hint has already been printed.
    pub async fn guard(&self, kind: GuardKind) -> bool {
        let mut guard = RouteGuard::new(kind);
        let mut rx = self.session.subscribe();
        guard.resolve(&mut rx, &TerminalNavigator).await == GuardView::Render
    }

    /// Turn a 401 into the sign-in redirect instead of an error.
    ///
    /// The transport has already cleared the session by the time the error
    /// arrives, so re-running the guard prints the hint.
    pub async fn authorized<T>(&self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Err(e) if e.is_unauthorized() => {
                self.guard(GuardKind::RequireAuth).await;
                Ok(None)
            }
            other => other.map(Some),
        }
    }
}

/// Spinner shown while the stored session is verified
fn restoring_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Restoring session...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Translates guard redirects into a hint naming the command to run.
pub struct TerminalNavigator;

impl TerminalNavigator {
    pub fn hint(route: Route) -> &'static str {
        match route {
            Route::SignIn => "Not signed in. Run 'openstock signin'",
            Route::Home => "Already signed in. Run 'openstock signout' to switch accounts",
        }
    }
}

impl Navigator for TerminalNavigator {
    fn push(&self, route: Route) {
        eprintln!("{}", Self::hint(route));
    }
}
