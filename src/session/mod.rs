//! Client-side session lifecycle
//!
//! [`Session`] owns the signed-in user and token, restores them from storage
//! on startup, and publishes every change through a watch channel that
//! route guards and the expiry monitor subscribe to.
//!
//! Phases: `Unknown → Restoring → {Authenticated, Anonymous}`. An
//! authenticated session returns to `Anonymous` on sign-out or when any
//! request comes back 401.

pub mod expiry;
mod task;

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::watch;

use crate::client::models::{AuthResponse, SignInFormData, SignUpFormData, User};
use crate::client::{AuthApi, AuthErrorObserver, OpenStockClient};
use crate::error::Result;

pub use expiry::ExpiryMonitor;
pub use task::ScheduledTask;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Unknown,
    Restoring,
    Authenticated,
    Anonymous,
}

/// Why the session was last cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// The user signed out
    SignOut,
    /// The backend answered 401
    Unauthorized,
    /// Startup restoration could not confirm the stored token
    RestoreFailed,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_loading: bool,
    pub phase: SessionPhase,
    pub cleared_by: Option<ClearReason>,
    /// Bumped by every transition that invalidates in-flight profile fetches
    generation: u64,
}

impl SessionSnapshot {
    pub(crate) fn initial() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: true,
            phase: SessionPhase::Unknown,
            cleared_by: None,
            generation: 0,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub(crate) fn clear(&mut self, reason: ClearReason) {
        self.user = None;
        self.token = None;
        self.is_loading = false;
        self.phase = SessionPhase::Anonymous;
        self.cleared_by = Some(reason);
        self.generation += 1;
    }

    pub(crate) fn authenticate(&mut self, token: String, user: User) {
        self.token = Some(token);
        self.user = Some(user);
        self.is_loading = false;
        self.phase = SessionPhase::Authenticated;
        self.cleared_by = None;
        self.generation += 1;
    }
}

/// The single session context shared by every consumer.
pub struct Session {
    client: Arc<OpenStockClient>,
    state: watch::Sender<SessionSnapshot>,
    // Serializes writes that must land in memory and in the transport together
    transition: tokio::sync::Mutex<()>,
    tasks: Mutex<Vec<ScheduledTask>>,
}

/// Routes the transport's 401 notification into a forced clear.
struct ClearOnAuthError {
    session: Weak<Session>,
}

#[async_trait]
impl AuthErrorObserver for ClearOnAuthError {
    async fn on_auth_error(&self) {
        if let Some(session) = self.session.upgrade() {
            debug!("Auth error reported by transport, clearing session");
            if let Err(e) = session.force_clear(ClearReason::Unauthorized).await {
                warn!("Rejected token could not be removed from storage: {}", e);
            }
        }
    }
}

impl Session {
    /// Create the session, register it for auth errors, and restore any
    /// persisted token.
    pub async fn start(client: Arc<OpenStockClient>) -> Result<Arc<Self>> {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        let session = Arc::new(Self {
            client,
            state,
            transition: tokio::sync::Mutex::new(()),
            tasks: Mutex::new(Vec::new()),
        });

        session
            .client
            .set_on_auth_error(Arc::new(ClearOnAuthError {
                session: Arc::downgrade(&session),
            }))
            .await;

        session.restore().await?;
        Ok(session)
    }

    /// Current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every future state change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn client(&self) -> &Arc<OpenStockClient> {
        &self.client
    }

    /// Rebuild the session from the persisted token.
    ///
    /// Anything short of a successful profile fetch ends `Anonymous` with the
    /// stored entry removed. Only storage failures are returned as errors.
    /// Failures that land after the session has moved on are ignored.
    pub async fn restore(&self) -> Result<SessionPhase> {
        let generation = {
            let _guard = self.transition.lock().await;
            let mut generation = 0;
            self.state.send_modify(|s| {
                s.user = None;
                s.token = None;
                s.is_loading = true;
                s.phase = SessionPhase::Restoring;
                s.generation += 1;
                generation = s.generation;
            });

            let Some(token) = self.client.stored_token()? else {
                debug!("No stored token, session is anonymous");
                self.state.send_modify(|s| {
                    s.is_loading = false;
                    s.phase = SessionPhase::Anonymous;
                });
                return Ok(SessionPhase::Anonymous);
            };

            self.client.set_token(Some(&token)).await?;
            self.state.send_modify(|s| s.token = Some(token));
            generation
        };

        match self.client.current_user().await {
            Ok(user) => {
                if self.apply_profile(generation, user) {
                    info!("Session restored");
                } else {
                    debug!("Discarding restored profile from superseded generation");
                }
            }
            Err(e) if e.is_unauthorized() => {
                // The transport has already forced a clear; repeat it in case
                // the observer registration was replaced.
                if self.is_current(generation) {
                    info!("Stored token rejected, signing out");
                    self.force_clear(ClearReason::Unauthorized).await?;
                }
            }
            Err(e) => {
                warn!("Could not verify stored session: {}", e);
                if self.is_current(generation) {
                    self.force_clear(ClearReason::RestoreFailed).await?;
                }
            }
        }

        Ok(self.state.borrow().phase)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.borrow().generation == generation
    }

    /// Apply a fetched profile unless the session moved on since the fetch
    /// began. Returns whether the state changed.
    fn apply_profile(&self, generation: u64, user: User) -> bool {
        self.state.send_if_modified(|s| {
            if s.generation != generation || s.token.is_none() {
                return false;
            }
            if s.phase == SessionPhase::Authenticated && s.user.as_ref() == Some(&user) {
                return false;
            }
            s.user = Some(user);
            s.is_loading = false;
            s.phase = SessionPhase::Authenticated;
            s.cleared_by = None;
            true
        })
    }

    /// Sign in with email and password.
    ///
    /// The backend response is returned as-is so a declined sign-in can show
    /// its message; only transport failures are errors.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let data = SignInFormData {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.client.sign_in(&data).await?;
        self.accept(&response).await?;
        Ok(response)
    }

    /// Register and sign in
    pub async fn sign_up(&self, data: &SignUpFormData) -> Result<AuthResponse> {
        let response = self.client.sign_up(data).await?;
        self.accept(&response).await?;
        Ok(response)
    }

    async fn accept(&self, response: &AuthResponse) -> Result<()> {
        let Some((token, user)) = response.credentials() else {
            debug!("Auth response did not establish a session");
            return Ok(());
        };

        let _guard = self.transition.lock().await;
        self.client.set_token(Some(token)).await?;
        self.state
            .send_modify(|s| s.authenticate(token.to_string(), user.clone()));
        info!("Signed in as {}", user.display_name());
        Ok(())
    }

    /// Sign out. The backend call is best-effort; local state is always
    /// cleared. Fails only if the stored token could not be removed.
    pub async fn sign_out(&self) -> Result<()> {
        if let Err(e) = self.client.sign_out().await {
            debug!("Ignoring sign-out failure: {}", e);
        }
        self.force_clear(ClearReason::SignOut).await
    }

    /// Reset user and token in memory, in the transport and in storage.
    /// Idempotent.
    ///
    /// Memory and the transport are cleared even when storage is not; the
    /// error says the persisted token outlived the session.
    pub async fn force_clear(&self, reason: ClearReason) -> Result<()> {
        let _guard = self.transition.lock().await;
        self.state.send_if_modified(|s| {
            let already_clear = s.phase == SessionPhase::Anonymous && s.token.is_none();
            if already_clear && s.cleared_by.is_some() {
                return false;
            }
            s.clear(reason);
            true
        });
        self.client.set_token(None).await
    }

    /// Re-confirm the token with a profile fetch.
    ///
    /// No-op unless authenticated. A 401 clears the session; other failures
    /// are logged and the session is kept.
    pub async fn revalidate(&self) -> SessionPhase {
        let generation = {
            let state = self.state.borrow();
            if !state.is_authenticated() {
                return state.phase;
            }
            state.generation
        };

        match self.client.current_user().await {
            Ok(user) => {
                self.apply_profile(generation, user);
                debug!("Session revalidated");
            }
            Err(e) if e.is_unauthorized() => {
                if self.is_current(generation) {
                    info!("Session no longer valid, signing out");
                    if let Err(e) = self.force_clear(ClearReason::Unauthorized).await {
                        warn!("Rejected token could not be removed from storage: {}", e);
                    }
                }
            }
            Err(e) => warn!("Session revalidation failed: {}", e),
        }

        self.state.borrow().phase
    }

    /// Revalidate on a fixed interval for as long as the session lives.
    pub fn spawn_revalidation(self: &Arc<Self>, interval: Duration) {
        let session = Arc::downgrade(self);
        let task = ScheduledTask::spawn("session revalidation", async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(session) = session.upgrade() else {
                    break;
                };
                session.revalidate().await;
            }
        });
        self.adopt(task);
    }

    /// Tie a background task to this session's lifetime
    pub fn adopt(&self, task: ScheduledTask) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(task);
        }
    }

    /// Stop all background tasks
    pub fn shutdown(&self) {
        let tasks = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => return,
        };
        for task in &tasks {
            debug!("Shutting down {}", task.name());
        }
        drop(tasks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::jwt::test_token;
    use crate::config::Config;
    use crate::storage::{KeyValueStore, MemoryStorage, TokenStore};

    const PROFILE: &str = r#"{"id": 1, "name": "Ada", "email": "ada@example.com"}"#;

    struct Harness {
        server: mockito::ServerGuard,
        backend: Arc<MemoryStorage>,
    }

    impl Harness {
        async fn new(stored: Option<&str>) -> Self {
            let server = mockito::Server::new_async().await;
            let backend = Arc::new(match stored {
                Some(token) => MemoryStorage::with_item("auth_token", token),
                None => MemoryStorage::default(),
            });
            Self { server, backend }
        }

        fn client(&self) -> Arc<OpenStockClient> {
            let config = Config::default().with_api_url(Some(&self.server.url()));
            let store = TokenStore::new(self.backend.clone(), "auth_token");
            Arc::new(OpenStockClient::new(&config, store).unwrap())
        }

        async fn start(&self) -> Arc<Session> {
            Session::start(self.client()).await.unwrap()
        }

        fn stored(&self) -> Option<String> {
            self.backend.get_item("auth_token").unwrap()
        }
    }

    fn assert_invariant(snapshot: &SessionSnapshot) {
        assert_eq!(
            snapshot.is_authenticated(),
            snapshot.token.is_some() && snapshot.user.is_some()
        );
        assert_eq!(
            snapshot.phase == SessionPhase::Authenticated,
            snapshot.is_authenticated()
        );
    }

    fn sign_in_ok(token: &str) -> String {
        format!(
            r#"{{"success": true, "token": "{}", "user": {}}}"#,
            token, PROFILE
        )
    }

    #[tokio::test]
    async fn test_start_without_token_is_anonymous() {
        let harness = Harness::new(None).await;
        let session = harness.start().await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert!(!snapshot.is_loading);
        assert_invariant(&snapshot);
    }

    #[tokio::test]
    async fn test_restore_with_valid_token() {
        let mut harness = Harness::new(Some("good")).await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .match_header("authorization", "Bearer good")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;

        let session = harness.start().await;
        let snapshot = session.snapshot();

        assert_eq!(snapshot.phase, SessionPhase::Authenticated);
        assert_eq!(snapshot.token.as_deref(), Some("good"));
        assert_eq!(snapshot.user.unwrap().display_name(), "Ada");
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn test_restore_with_expired_token_clears_storage() {
        let mut harness = Harness::new(Some("expired")).await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(401)
            .create_async()
            .await;

        let session = harness.start().await;
        let snapshot = session.snapshot();

        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert_eq!(snapshot.cleared_by, Some(ClearReason::Unauthorized));
        assert!(!snapshot.is_loading);
        assert_eq!(harness.stored(), None);
        assert_eq!(session.client().token().await, None);
        assert_invariant(&snapshot);
    }

    #[tokio::test]
    async fn test_restore_transient_failure_is_anonymous() {
        let mut harness = Harness::new(Some("maybe")).await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(503)
            .create_async()
            .await;

        let session = harness.start().await;
        let snapshot = session.snapshot();

        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert_eq!(snapshot.cleared_by, Some(ClearReason::RestoreFailed));
        assert_eq!(harness.stored(), None);
        assert_eq!(session.client().token().await, None);
    }

    #[tokio::test]
    async fn test_sign_in_success_mirrors_token() {
        let mut harness = Harness::new(None).await;
        let token = test_token(chrono::Utc::now().timestamp() + 3600);
        harness
            .server
            .mock("POST", "/api/auth/signin")
            .with_status(200)
            .with_body(sign_in_ok(&token))
            .create_async()
            .await;

        let session = harness.start().await;
        let mut rx = session.subscribe();

        let response = session.sign_in("ada@example.com", "password123").await.unwrap();
        assert!(response.success);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Authenticated);
        assert_eq!(snapshot.token.as_deref(), Some(token.as_str()));
        assert_eq!(harness.stored().as_deref(), Some(token.as_str()));
        assert_eq!(session.client().token().await.as_deref(), Some(token.as_str()));
        assert!(rx.has_changed().unwrap());
        assert_invariant(&rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_declined_sign_in_returns_message() {
        let mut harness = Harness::new(None).await;
        harness
            .server
            .mock("POST", "/api/auth/signin")
            .with_status(200)
            .with_body(r#"{"success": false, "message": "Invalid email or password."}"#)
            .create_async()
            .await;

        let session = harness.start().await;
        let response = session.sign_in("a@b.com", "short").await.unwrap();

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Invalid email or password."));
        assert_eq!(session.snapshot().phase, SessionPhase::Anonymous);
        assert_eq!(harness.stored(), None);
    }

    #[tokio::test]
    async fn test_sign_in_transport_failure_is_error() {
        let mut harness = Harness::new(None).await;
        harness
            .server
            .mock("POST", "/api/auth/signin")
            .with_status(500)
            .create_async()
            .await;

        let session = harness.start().await;
        assert!(session.sign_in("a@b.com", "password123").await.is_err());
        assert_eq!(session.snapshot().phase, SessionPhase::Anonymous);
    }

    #[tokio::test]
    async fn test_unpersisted_sign_in_stays_anonymous() {
        let mut harness = Harness::new(None).await;
        harness
            .server
            .mock("POST", "/api/auth/signin")
            .with_status(200)
            .with_body(sign_in_ok("fresh"))
            .create_async()
            .await;

        let session = harness.start().await;
        harness.backend.fail_writes(true);

        assert!(session.sign_in("ada@example.com", "password123").await.is_err());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert_eq!(snapshot.token, None);
        assert_eq!(session.client().token().await, None);
        assert_eq!(harness.stored(), None);
    }

    #[tokio::test]
    async fn test_sign_out_reports_token_left_in_storage() {
        let mut harness = Harness::new(Some("good")).await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;
        harness
            .server
            .mock("POST", "/api/auth/signout")
            .with_status(200)
            .create_async()
            .await;

        let session = harness.start().await;
        assert!(session.is_authenticated());
        harness.backend.fail_writes(true);

        let err = session.sign_out().await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Storage(_)));

        // This process no longer holds the token anywhere
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert_eq!(snapshot.cleared_by, Some(ClearReason::SignOut));
        assert_eq!(session.client().token().await, None);
        assert_eq!(harness.stored().as_deref(), Some("good"));
    }

    #[tokio::test]
    async fn test_sign_up_success() {
        let mut harness = Harness::new(None).await;
        harness
            .server
            .mock("POST", "/api/auth/signup")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "fullName": "Ada Lovelace",
                "email": "ada@example.com"
            })))
            .with_status(200)
            .with_body(sign_in_ok("new-token"))
            .create_async()
            .await;

        let session = harness.start().await;
        let data = SignUpFormData {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "password123".to_string(),
            ..Default::default()
        };
        session.sign_up(&data).await.unwrap();

        assert!(session.is_authenticated());
        assert_eq!(harness.stored().as_deref(), Some("new-token"));
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_when_backend_fails() {
        let mut harness = Harness::new(Some("good")).await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;
        harness
            .server
            .mock("POST", "/api/auth/signout")
            .with_status(500)
            .create_async()
            .await;

        let session = harness.start().await;
        assert!(session.is_authenticated());

        session.sign_out().await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert_eq!(snapshot.cleared_by, Some(ClearReason::SignOut));
        assert_eq!(harness.stored(), None);
        assert_eq!(session.client().token().await, None);
    }

    #[tokio::test]
    async fn test_sign_out_clears_on_network_error() {
        let backend = Arc::new(MemoryStorage::with_item("auth_token", "good"));
        let config = Config::default().with_api_url(Some("http://127.0.0.1:1"));
        let client = Arc::new(
            OpenStockClient::new(&config, TokenStore::new(backend.clone(), "auth_token")).unwrap(),
        );

        // Restoration fails too, so seed an authenticated state by hand
        let session = Session::start(client).await.unwrap();
        session.client().set_token(Some("good")).await.unwrap();
        session.state.send_modify(|s| {
            s.authenticate("good".to_string(), serde_json::from_str(PROFILE).unwrap())
        });

        session.sign_out().await.unwrap();

        assert!(!session.is_authenticated());
        assert_eq!(backend.get_item("auth_token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_any_401_forces_clear() {
        let mut harness = Harness::new(Some("good")).await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;
        harness
            .server
            .mock("GET", "/api/watchlist")
            .with_status(401)
            .create_async()
            .await;

        let session = harness.start().await;
        assert!(session.is_authenticated());

        let err = crate::client::WatchlistApi::watchlist(session.client().as_ref())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        // Cleared before the caller saw the error
        let snapshot = session.snapshot();
        assert_eq!(snapshot.token, None);
        assert_eq!(snapshot.user, None);
        assert_eq!(snapshot.cleared_by, Some(ClearReason::Unauthorized));
        assert_eq!(harness.stored(), None);
    }

    #[tokio::test]
    async fn test_profile_403_keeps_session() {
        let mut harness = Harness::new(Some("good")).await;
        let profile = harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;

        let session = harness.start().await;
        profile.remove_async().await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(403)
            .create_async()
            .await;

        let err = session.client().current_user().await.unwrap_err();
        assert!(!err.is_unauthorized());
        assert!(session.is_authenticated());
        assert_eq!(harness.stored().as_deref(), Some("good"));
    }

    #[tokio::test]
    async fn test_revalidate_keeps_session_on_server_error() {
        let mut harness = Harness::new(Some("good")).await;
        let profile = harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;

        let session = harness.start().await;
        profile.remove_async().await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(500)
            .create_async()
            .await;

        assert_eq!(session.revalidate().await, SessionPhase::Authenticated);
        assert_eq!(harness.stored().as_deref(), Some("good"));
    }

    #[tokio::test]
    async fn test_revalidate_401_clears() {
        let mut harness = Harness::new(Some("good")).await;
        let profile = harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;

        let session = harness.start().await;
        profile.remove_async().await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(401)
            .create_async()
            .await;

        assert_eq!(session.revalidate().await, SessionPhase::Anonymous);
        assert_eq!(harness.stored(), None);
    }

    #[tokio::test]
    async fn test_revalidate_when_anonymous_is_noop() {
        let mut harness = Harness::new(None).await;
        let profile = harness
            .server
            .mock("GET", "/api/user/profile")
            .expect(0)
            .create_async()
            .await;

        let session = harness.start().await;
        assert_eq!(session.revalidate().await, SessionPhase::Anonymous);
        profile.assert_async().await;
    }

    #[tokio::test]
    async fn test_profile_from_superseded_generation_is_discarded() {
        let mut harness = Harness::new(Some("good")).await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;

        let session = harness.start().await;
        let generation = session.state.borrow().generation;
        session.force_clear(ClearReason::SignOut).await.unwrap();

        let user: User = serde_json::from_str(PROFILE).unwrap();
        assert!(!session.apply_profile(generation, user));
        assert_eq!(session.snapshot().phase, SessionPhase::Anonymous);
        assert_invariant(&session.snapshot());
    }

    #[tokio::test]
    async fn test_stale_revalidation_does_not_resurrect() {
        use std::io::Write;

        let mut harness = Harness::new(Some("good")).await;
        let profile = harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;

        let session = harness.start().await;
        profile.remove_async().await;

        // Slow profile response lands after a concurrent sign-out
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(300));
                w.write_all(PROFILE.as_bytes())
            })
            .create_async()
            .await;
        harness
            .server
            .mock("POST", "/api/auth/signout")
            .with_status(200)
            .create_async()
            .await;

        let revalidating = {
            let session = session.clone();
            tokio::spawn(async move { session.revalidate().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.sign_out().await.unwrap();

        assert_eq!(revalidating.await.unwrap(), SessionPhase::Anonymous);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.user, None);
        assert_eq!(snapshot.token, None);
        assert_invariant(&snapshot);
    }

    #[tokio::test]
    async fn test_stale_401_does_not_end_new_session() {
        use std::io::Write;

        let mut harness = Harness::new(Some("old")).await;
        let profile = harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;

        let session = harness.start().await;
        profile.remove_async().await;

        // The old token is rejected, but only after the user signed in again
        harness
            .server
            .mock("GET", "/api/user/profile")
            .match_header("authorization", "Bearer old")
            .with_status(401)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(300));
                w.write_all(br#"{"message": "Token expired"}"#)
            })
            .create_async()
            .await;
        harness
            .server
            .mock("POST", "/api/auth/signin")
            .with_status(200)
            .with_body(sign_in_ok("new"))
            .create_async()
            .await;

        let revalidating = {
            let session = session.clone();
            tokio::spawn(async move { session.revalidate().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.sign_in("ada@example.com", "password123").await.unwrap();

        assert_eq!(revalidating.await.unwrap(), SessionPhase::Authenticated);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.token.as_deref(), Some("new"));
        assert_eq!(session.client().token().await.as_deref(), Some("new"));
        assert_eq!(harness.stored().as_deref(), Some("new"));
        assert_invariant(&snapshot);
    }

    #[tokio::test]
    async fn test_force_clear_is_idempotent() {
        let harness = Harness::new(None).await;
        let session = harness.start().await;
        let mut rx = session.subscribe();

        session.force_clear(ClearReason::Unauthorized).await.unwrap();
        let first = rx.borrow_and_update().clone();
        session.force_clear(ClearReason::Unauthorized).await.unwrap();

        assert!(!rx.has_changed().unwrap());
        assert_eq!(session.snapshot(), first);
        assert_invariant(&first);
    }

    #[tokio::test]
    async fn test_periodic_revalidation_clears_on_401() {
        let mut harness = Harness::new(Some("good")).await;
        let profile = harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;

        let session = harness.start().await;
        profile.remove_async().await;
        harness
            .server
            .mock("GET", "/api/user/profile")
            .with_status(401)
            .create_async()
            .await;

        let mut rx = session.subscribe();
        session.spawn_revalidation(Duration::from_millis(50));

        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| !s.is_authenticated()))
            .await
            .expect("revalidation should run")
            .unwrap();
        assert_eq!(harness.stored(), None);
        session.shutdown();
    }
}
