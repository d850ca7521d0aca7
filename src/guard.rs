//! Route guards
//!
//! A guard decides whether a view may render for the current session. While
//! restoration is in progress it renders a loading state and does nothing
//! else; once the session settles it either renders the view or redirects.
//! A redirect fires once per state transition, not once per evaluation.

use tokio::sync::watch;

use crate::session::SessionSnapshot;

/// Destinations a guard can redirect to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
}

/// Which sessions a guarded view accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    /// Protected views: signed-in users only
    RequireAuth,
    /// Sign-in and sign-up views: anonymous users only
    RequireAnonymous,
}

/// What the guarded view should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView {
    Loading,
    Render,
    /// Render nothing; navigation to the route has been requested
    Redirect(Route),
}

/// Performs the navigation a guard requests
pub trait Navigator {
    fn push(&self, route: Route);
}

pub struct RouteGuard {
    kind: GuardKind,
    // (is_loading, is_authenticated) at the previous evaluation
    last: Option<(bool, bool)>,
}

impl RouteGuard {
    pub fn new(kind: GuardKind) -> Self {
        Self { kind, last: None }
    }

    /// Evaluate the guard against `snapshot`, navigating if this evaluation
    /// is the first to observe a state that must redirect.
    pub fn evaluate(&mut self, snapshot: &SessionSnapshot, nav: &dyn Navigator) -> GuardView {
        let state = (snapshot.is_loading, snapshot.is_authenticated());
        let changed = self.last != Some(state);
        self.last = Some(state);

        let (is_loading, is_authenticated) = state;
        if is_loading {
            return GuardView::Loading;
        }

        let redirect = match self.kind {
            GuardKind::RequireAuth if !is_authenticated => Some(Route::SignIn),
            GuardKind::RequireAnonymous if is_authenticated => Some(Route::Home),
            _ => None,
        };

        match redirect {
            Some(route) => {
                if changed {
                    log::debug!("{:?} guard redirecting to {:?}", self.kind, route);
                    nav.push(route);
                }
                GuardView::Redirect(route)
            }
            None => GuardView::Render,
        }
    }

    /// Wait for the session to settle, then evaluate.
    ///
    /// Returns `Loading` only if the session goes away before it settles.
    pub async fn resolve(
        &mut self,
        rx: &mut watch::Receiver<SessionSnapshot>,
        nav: &dyn Navigator,
    ) -> GuardView {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            let view = self.evaluate(&snapshot, nav);
            if view != GuardView::Loading {
                return view;
            }
            if rx.changed().await.is_err() {
                return view;
            }
        }
    }
}
