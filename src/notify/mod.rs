//! Toast-style notifications
//!
//! Toasts are keyed by id: showing a toast whose id is already active
//! replaces it, so a producer that re-evaluates on every tick never stacks
//! duplicates. Each toast is dropped once its duration elapses.

mod terminal;

use std::sync::Mutex;
use std::time::{Duration, Instant};

pub use terminal::TerminalNotifier;

/// Severity of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// What a toast's action button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastActionKind {
    /// Re-run session restoration
    ExtendSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastAction {
    pub label: String,
    pub kind: ToastActionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub level: ToastLevel,
    pub message: String,
    pub duration: Duration,
    pub action: Option<ToastAction>,
}

impl Toast {
    pub fn new(id: impl Into<String>, level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level,
            message: message.into(),
            duration: Duration::from_secs(4),
            action: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_action(mut self, label: impl Into<String>, kind: ToastActionKind) -> Self {
        self.action = Some(ToastAction {
            label: label.into(),
            kind,
        });
        self
    }
}

/// Somewhere toasts can be shown
pub trait Notifier: Send + Sync {
    fn show(&self, toast: Toast);

    fn dismiss(&self, id: &str);
}

/// In-memory set of active toasts
#[derive(Default)]
pub struct ToastCenter {
    active: Mutex<Vec<(Toast, Instant)>>,
}

impl ToastCenter {
    /// Insert or replace a toast. Returns false when an identical toast
    /// is already active.
    pub fn upsert(&self, toast: Toast) -> bool {
        self.upsert_at(toast, Instant::now())
    }

    fn upsert_at(&self, toast: Toast, now: Instant) -> bool {
        let Ok(mut active) = self.active.lock() else {
            return false;
        };
        prune(&mut active, now);

        if let Some(entry) = active.iter_mut().find(|(t, _)| t.id == toast.id) {
            if entry.0 == toast {
                return false;
            }
            *entry = (toast, now);
            return true;
        }

        active.push((toast, now));
        true
    }

    pub fn remove(&self, id: &str) -> Option<Toast> {
        let mut active = self.active.lock().ok()?;
        let idx = active.iter().position(|(t, _)| t.id == id)?;
        Some(active.remove(idx).0)
    }

    /// Toasts whose duration has not elapsed
    #[cfg(test)]
    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }

    #[cfg(test)]
    fn active_at(&self, now: Instant) -> Vec<Toast> {
        match self.active.lock() {
            Ok(mut active) => {
                prune(&mut active, now);
                active.iter().map(|(t, _)| t.clone()).collect()
            }
            Err(_) => Vec::new(),
        }
    }

    /// Trigger the action of an active toast, dismissing it
    pub fn take_action(&self, id: &str) -> Option<ToastActionKind> {
        let mut active = self.active.lock().ok()?;
        prune(&mut active, Instant::now());
        let idx = active.iter().position(|(t, _)| t.id == id)?;
        active.remove(idx).0.action.map(|a| a.kind)
    }
}

fn prune(active: &mut Vec<(Toast, Instant)>, now: Instant) {
    active.retain(|(toast, shown_at)| now.duration_since(*shown_at) < toast.duration);
}

impl Notifier for ToastCenter {
    fn show(&self, toast: Toast) {
        self.upsert(toast);
    }

    fn dismiss(&self, id: &str) {
        self.remove(id);
    }
}
