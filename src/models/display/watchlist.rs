//! Watchlist display model

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use crate::client::models::WatchlistItem;

/// Watchlist entry display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct WatchlistDisplay {
    #[tabled(rename = "SYMBOL")]
    pub symbol: String,

    #[tabled(rename = "COMPANY")]
    pub company: String,

    #[tabled(rename = "ADDED")]
    pub added_at: String,
}

/// Date part of an ISO timestamp, or the raw value if it does not parse
fn added_date(added_at: &str) -> String {
    match added_at.parse::<DateTime<Utc>>() {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) if added_at.is_empty() => "--".to_string(),
        Err(_) => added_at.to_string(),
    }
}

impl From<WatchlistItem> for WatchlistDisplay {
    fn from(item: WatchlistItem) -> Self {
        Self {
            added_at: added_date(&item.added_at),
            symbol: item.symbol,
            company: item.company,
        }
    }
}
