//! Notifications rendered on stderr

use colored::Colorize;

use super::{Notifier, Toast, ToastCenter, ToastLevel};

/// Prints each new or changed toast once and tracks it in a [`ToastCenter`].
#[derive(Default)]
pub struct TerminalNotifier {
    center: ToastCenter,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(&self) -> &ToastCenter {
        &self.center
    }
}

/// Render a toast as a single terminal line
pub fn render(toast: &Toast) -> String {
    let badge = match toast.level {
        ToastLevel::Info => "ℹ".cyan(),
        ToastLevel::Success => "✓".green(),
        ToastLevel::Warning => "⚠".yellow(),
        ToastLevel::Error => "✗".red(),
    };

    match &toast.action {
        Some(action) => format!(
            "{} {}  [{}: press Enter]",
            badge,
            toast.message,
            action.label.bold()
        ),
        None => format!("{} {}", badge, toast.message),
    }
}

impl Notifier for TerminalNotifier {
    fn show(&self, toast: Toast) {
        let line = render(&toast);
        if self.center.upsert(toast) {
            eprintln!("{}", line);
        }
    }

    fn dismiss(&self, id: &str) {
        self.center.remove(id);
    }
}
