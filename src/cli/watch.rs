//! Watch command: keep the session alive until interrupted
//!
//! Revalidates the session periodically and warns before the token expires.
//! Pressing Enter while the warning is up extends the session.

use std::sync::Arc;

use colored::Colorize;
use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::cli::context::TerminalNavigator;
use crate::error::Result;
use crate::guard::{GuardKind, GuardView, RouteGuard};
use crate::notify::{Notifier, TerminalNotifier, Toast, ToastActionKind, ToastLevel};
use crate::session::expiry::EXPIRY_TOAST_ID;
use crate::session::{ExpiryMonitor, Session, SessionPhase};

const REFRESH_TOAST_ID: &str = "session-refresh";

/// Run the watch command
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !ctx.guard(GuardKind::RequireAuth).await {
        return Ok(());
    }

    let session = ctx.session.clone();
    let notifier = ctx.notifier.clone();

    session.spawn_revalidation(ctx.config.revalidate_interval());
    let monitor = ExpiryMonitor::new(notifier.clone(), ctx.config.warning_window());
    session.adopt(monitor.spawn(&session, ctx.config.expiry_check_interval()));

    if let Some(user) = session.snapshot().user {
        println!(
            "Watching session for {} {}",
            user.display_name().bold(),
            "(Ctrl-C to stop)".dimmed()
        );
    }

    let outcome = watch_loop(&session, &notifier).await;
    session.shutdown();
    outcome
}

async fn watch_loop(session: &Arc<Session>, notifier: &TerminalNotifier) -> Result<()> {
    let mut guard = RouteGuard::new(GuardKind::RequireAuth);
    let mut rx = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("Interrupted");
                return Ok(());
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let snapshot = rx.borrow_and_update().clone();
                if let GuardView::Redirect(_) = guard.evaluate(&snapshot, &TerminalNavigator) {
                    return Ok(());
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(_) => extend(session, notifier).await,
                    None => stdin_open = false,
                }
            }
        }
    }
}

/// Run the pending toast action, if any
async fn extend(session: &Session, notifier: &TerminalNotifier) {
    match notifier.center().take_action(EXPIRY_TOAST_ID) {
        Some(ToastActionKind::ExtendSession) => match session.restore().await {
            Ok(SessionPhase::Authenticated) => notifier.show(Toast::new(
                REFRESH_TOAST_ID,
                ToastLevel::Success,
                "Session refreshed",
            )),
            Ok(phase) => debug!("Session ended up {:?} after refresh", phase),
            Err(e) => notifier.show(Toast::new(
                REFRESH_TOAST_ID,
                ToastLevel::Error,
                format!("Could not refresh session: {}", e),
            )),
        },
        None => debug!("No pending action"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::OpenStockClient;
    use crate::config::Config;
    use crate::storage::{MemoryStorage, TokenStore};

    const PROFILE: &str = r#"{"name": "Ada", "email": "ada@example.com"}"#;

    async fn session_for(server: &mockito::ServerGuard) -> Arc<Session> {
        let config = Config::default().with_api_url(Some(&server.url()));
        let backend = Arc::new(MemoryStorage::with_item("auth_token", "good"));
        let client = OpenStockClient::new(&config, TokenStore::new(backend, "auth_token")).unwrap();
        Session::start(Arc::new(client)).await.unwrap()
    }

    fn expiry_warning() -> Toast {
        Toast::new(
            EXPIRY_TOAST_ID,
            ToastLevel::Warning,
            "Your session will expire in 2 minutes",
        )
        .with_action("Extend Session", ToastActionKind::ExtendSession)
    }

    #[tokio::test]
    async fn test_extend_reverifies_session() {
        let mut server = mockito::Server::new_async().await;
        let profile = server
            .mock("GET", "/api/user/profile")
            .match_header("authorization", "Bearer good")
            .with_status(200)
            .with_body(PROFILE)
            .expect(2)
            .create_async()
            .await;

        let session = session_for(&server).await;
        let notifier = TerminalNotifier::new();
        notifier.show(expiry_warning());

        extend(&session, &notifier).await;

        profile.assert_async().await;
        assert!(session.is_authenticated());
        let active = notifier.center().active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, REFRESH_TOAST_ID);
        assert_eq!(active[0].level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn test_extend_without_warning_is_noop() {
        let mut server = mockito::Server::new_async().await;
        let profile = server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .expect(1)
            .create_async()
            .await;

        let session = session_for(&server).await;
        let notifier = TerminalNotifier::new();

        extend(&session, &notifier).await;

        profile.assert_async().await;
        assert!(session.is_authenticated());
        assert!(notifier.center().active().is_empty());
    }

    #[tokio::test]
    async fn test_extend_with_rejected_token_signs_out() {
        let mut server = mockito::Server::new_async().await;
        let profile = server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;

        let session = session_for(&server).await;
        profile.remove_async().await;
        server
            .mock("GET", "/api/user/profile")
            .with_status(401)
            .create_async()
            .await;

        let notifier = TerminalNotifier::new();
        notifier.show(expiry_warning());
        extend(&session, &notifier).await;

        assert!(!session.is_authenticated());
        assert_eq!(session.snapshot().phase, SessionPhase::Anonymous);
        assert!(notifier.center().active().is_empty());
    }
}
