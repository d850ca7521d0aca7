//! Reusable formatting utilities for CLI output
//!
//! Prices, changes, volumes and timestamps as they appear across the quote,
//! watchlist and news commands.

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};

/// Format a price with two decimals and its currency.
///
/// # Example output
/// - `$189.50` (USD or unknown currency)
/// - `142.10 EUR`
pub fn format_price(price: f64, currency: &str) -> String {
    match currency {
        "" | "USD" => format!("${:.2}", price),
        other => format!("{:.2} {}", price, other),
    }
}

/// Signed absolute change, e.g. `+2.50` or `-0.75`
pub fn format_change(change: f64) -> String {
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{}{:.2}", sign, change)
}

/// Signed percentage change, e.g. `+1.34%`
pub fn format_change_percent(percent: f64) -> String {
    let sign = if percent >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, percent)
}

/// Colour `text` by the sign of `change`
pub fn colorize_change(text: &str, change: f64) -> ColoredString {
    if change > 0.0 {
        text.green()
    } else if change < 0.0 {
        text.red()
    } else {
        text.normal()
    }
}

/// Compact trading volume.
///
/// # Example output
/// `950`, `12.3K`, `1.2M`, `3.4B`
pub fn format_volume(volume: u64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

    let value = volume as f64;
    for (scale, suffix) in UNITS {
        if value >= scale {
            return format!("{:.1}{}", value / scale, suffix);
        }
    }
    volume.to_string()
}

/// Format a Unix timestamp (seconds) as local date and time.
///
/// Returns "N/A" for zero or out-of-range timestamps.
pub fn format_timestamp_local(secs: i64) -> String {
    if secs == 0 {
        return "N/A".to_string();
    }
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt
            .with_timezone(&Local)
            .format("%m/%d/%Y %H:%M")
            .to_string(),
        None => "N/A".to_string(),
    }
}

/// Time left until `expires_at`, e.g. `2h 15m` or `4m`.
///
/// Returns "expired" once the instant has passed.
pub fn format_remaining(expires_at: DateTime<chrono::Utc>, now: DateTime<chrono::Utc>) -> String {
    let remaining = expires_at.signed_duration_since(now);
    if remaining.num_seconds() <= 0 {
        return "expired".to_string();
    }

    let hours = remaining.num_hours();
    let mins = remaining.num_minutes() % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m", mins)
    } else {
        format!("{}s", remaining.num_seconds())
    }
}
