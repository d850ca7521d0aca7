//! Watchlist models

use serde::{Deserialize, Serialize};

/// Entry of the signed-in user's watchlist
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub symbol: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub added_at: String,
}

/// Body of `POST /api/watchlist`
#[derive(Debug, Clone, Serialize)]
pub struct AddWatchlistRequest<'a> {
    pub symbol: &'a str,
    pub company: &'a str,
}
