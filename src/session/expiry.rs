//! Session expiry warnings
//!
//! Reads `exp` from the held token and, once expiry is inside the warning
//! window, shows a toast offering to extend the session. Every evaluation
//! starts from scratch; the stable toast id keeps at most one warning active.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::{ScheduledTask, Session, SessionSnapshot};
use crate::client::jwt::token_expiry;
use crate::notify::{Notifier, Toast, ToastActionKind, ToastLevel};

/// Id of the expiry toast
pub const EXPIRY_TOAST_ID: &str = "session-expiry";

/// How long the warning toast stays up
const WARNING_TOAST_DURATION: Duration = Duration::from_secs(10);

/// An imminent expiry, in whole minutes rounded up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWarning {
    pub minutes_left: i64,
}

impl ExpiryWarning {
    pub fn message(&self) -> String {
        let unit = if self.minutes_left == 1 {
            "minute"
        } else {
            "minutes"
        };
        format!("Your session will expire in {} {}", self.minutes_left, unit)
    }
}

/// Decide whether `token` warrants a warning at `now`.
///
/// Absent, undecodable, expired, or not-yet-close tokens yield `None`.
pub fn evaluate(token: Option<&str>, now: DateTime<Utc>, window: Duration) -> Option<ExpiryWarning> {
    let token = token?;
    let expires_at = match token_expiry(token) {
        Ok(expires_at) => expires_at,
        Err(e) => {
            warn!("Could not read token expiry: {}", e);
            return None;
        }
    };

    let remaining_ms = (expires_at - now).num_milliseconds();
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);

    if remaining_ms <= 0 || remaining_ms > window_ms {
        return None;
    }

    Some(ExpiryWarning {
        minutes_left: (remaining_ms + 59_999) / 60_000,
    })
}

/// Shows and withdraws the expiry warning as the session evolves.
pub struct ExpiryMonitor {
    notifier: Arc<dyn Notifier>,
    window: Duration,
}

impl ExpiryMonitor {
    pub fn new(notifier: Arc<dyn Notifier>, window: Duration) -> Self {
        Self { notifier, window }
    }

    /// Evaluate one snapshot. Returns the warning that is now showing.
    pub fn check(&self, snapshot: &SessionSnapshot, now: DateTime<Utc>) -> Option<ExpiryWarning> {
        let token = snapshot
            .is_authenticated()
            .then_some(snapshot.token.as_deref())
            .flatten();

        match evaluate(token, now, self.window) {
            Some(warning) => {
                debug!("Session expires in {} minute(s)", warning.minutes_left);
                self.notifier.show(
                    Toast::new(EXPIRY_TOAST_ID, ToastLevel::Warning, warning.message())
                        .with_duration(WARNING_TOAST_DURATION)
                        .with_action("Extend Session", ToastActionKind::ExtendSession),
                );
                Some(warning)
            }
            None => {
                self.notifier.dismiss(EXPIRY_TOAST_ID);
                None
            }
        }
    }

    /// Re-check on every session change and every `interval`, until the
    /// session is dropped or the task is cancelled.
    pub fn spawn(self, session: &Arc<Session>, interval: Duration) -> ScheduledTask {
        let mut rx = session.subscribe();
        ScheduledTask::spawn("expiry monitor", async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                let snapshot = rx.borrow_and_update().clone();
                self.check(&snapshot, Utc::now());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::client::OpenStockClient;
    use crate::client::jwt::test_token;
    use crate::client::models::{AuthResponse, User};
    use crate::config::Config;
    use crate::notify::ToastCenter;
    use crate::session::{ClearReason, SessionPhase};
    use crate::storage::{MemoryStorage, TokenStore};

    const WINDOW: Duration = Duration::from_secs(5 * 60);

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_800_000_000, 0).unwrap()
    }

    /// A session that starts anonymous and never reaches the network
    async fn offline_session() -> Arc<Session> {
        let config = Config::default().with_api_url(Some("http://127.0.0.1:1"));
        let store = TokenStore::new(Arc::new(MemoryStorage::default()), "auth_token");
        let client = OpenStockClient::new(&config, store).unwrap();
        Session::start(Arc::new(client)).await.unwrap()
    }

    fn signed_in_with(token: &str) -> AuthResponse {
        serde_json::from_value(serde_json::json!({
            "success": true,
            "token": token,
            "user": {"name": "Ada"}
        }))
        .unwrap()
    }

    async fn eventually(condition: impl Fn() -> bool) -> bool {
        for _ in 0..200 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition()
    }

    fn authenticated(token: String) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot::initial();
        let user: User = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        snapshot.authenticate(token, user);
        snapshot
    }

    #[test]
    fn test_two_minutes_left() {
        let token = test_token(now().timestamp() + 120);
        let warning = evaluate(Some(&token), now(), WINDOW).unwrap();
        assert_eq!(warning.minutes_left, 2);
        assert_eq!(warning.message(), "Your session will expire in 2 minutes");
    }

    #[test]
    fn test_rounds_up() {
        let token = test_token(now().timestamp() + 61);
        assert_eq!(evaluate(Some(&token), now(), WINDOW).unwrap().minutes_left, 2);

        let token = test_token(now().timestamp() + 30);
        let warning = evaluate(Some(&token), now(), WINDOW).unwrap();
        assert_eq!(warning.minutes_left, 1);
        assert_eq!(warning.message(), "Your session will expire in 1 minute");
    }

    #[test]
    fn test_window_boundaries() {
        let token = test_token(now().timestamp() + 300);
        assert_eq!(evaluate(Some(&token), now(), WINDOW).unwrap().minutes_left, 5);

        let token = test_token(now().timestamp() + 301);
        assert!(evaluate(Some(&token), now(), WINDOW).is_none());
    }

    #[test]
    fn test_expired_or_missing_token() {
        let token = test_token(now().timestamp());
        assert!(evaluate(Some(&token), now(), WINDOW).is_none());

        let token = test_token(now().timestamp() - 60);
        assert!(evaluate(Some(&token), now(), WINDOW).is_none());

        assert!(evaluate(None, now(), WINDOW).is_none());
    }

    #[test]
    fn test_malformed_token_is_swallowed() {
        assert!(evaluate(Some("not-a-jwt"), now(), WINDOW).is_none());
        assert!(evaluate(Some("a.%%%.c"), now(), WINDOW).is_none());
    }

    #[test]
    fn test_exactly_one_warning_across_ticks() {
        let center = Arc::new(ToastCenter::default());
        let monitor = ExpiryMonitor::new(center.clone(), WINDOW);
        let snapshot = authenticated(test_token(now().timestamp() + 200));

        for tick in 0..3 {
            monitor.check(&snapshot, now() + ChronoDuration::seconds(tick * 60));
        }

        let active = center.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "Your session will expire in 2 minutes");
        assert_eq!(
            active[0].action.as_ref().map(|a| a.label.as_str()),
            Some("Extend Session")
        );
    }

    #[test]
    fn test_no_warning_outside_window() {
        let center = Arc::new(ToastCenter::default());
        let monitor = ExpiryMonitor::new(center.clone(), WINDOW);

        let early = authenticated(test_token(now().timestamp() + 3600));
        assert!(monitor.check(&early, now()).is_none());

        let late = authenticated(test_token(now().timestamp() - 1));
        assert!(monitor.check(&late, now()).is_none());

        assert!(center.active().is_empty());
    }

    #[test]
    fn test_warning_withdrawn_after_sign_out() {
        let center = Arc::new(ToastCenter::default());
        let monitor = ExpiryMonitor::new(center.clone(), WINDOW);

        let mut snapshot = authenticated(test_token(now().timestamp() + 120));
        assert!(monitor.check(&snapshot, now()).is_some());
        assert_eq!(center.active().len(), 1);

        snapshot.clear(ClearReason::SignOut);
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert!(monitor.check(&snapshot, now()).is_none());
        assert!(center.active().is_empty());
    }

    #[test]
    fn test_ignores_token_without_user() {
        let center = Arc::new(ToastCenter::default());
        let monitor = ExpiryMonitor::new(center.clone(), WINDOW);

        let mut snapshot = SessionSnapshot::initial();
        snapshot.token = Some(test_token(now().timestamp() + 120));
        assert!(monitor.check(&snapshot, now()).is_none());
    }

    #[tokio::test]
    async fn test_spawned_monitor_follows_session_changes() {
        let session = offline_session().await;
        let center = Arc::new(ToastCenter::default());
        // Interval long enough that only session changes trigger a check
        let _task = ExpiryMonitor::new(center.clone(), WINDOW)
            .spawn(&session, Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(center.active().is_empty());

        let token = test_token(Utc::now().timestamp() + 120);
        session.accept(&signed_in_with(&token)).await.unwrap();
        assert!(eventually(|| center.active().len() == 1).await);
        assert_eq!(
            center.active()[0].message,
            "Your session will expire in 2 minutes"
        );

        session.force_clear(ClearReason::SignOut).await.unwrap();
        assert!(eventually(|| center.active().is_empty()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_monitor_rechecks_every_interval() {
        let session = offline_session().await;
        let token = test_token(Utc::now().timestamp() + 120);
        session.accept(&signed_in_with(&token)).await.unwrap();

        let center = Arc::new(ToastCenter::default());
        let _task = ExpiryMonitor::new(center.clone(), WINDOW)
            .spawn(&session, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(center.active().len(), 1);

        // The session stays untouched; only the ticker can bring it back
        center.remove(EXPIRY_TOAST_ID);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(center.active().is_empty());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(center.active().len(), 1);
    }
}
