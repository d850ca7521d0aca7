//! Watchlist API trait

use async_trait::async_trait;

use crate::client::models::WatchlistItem;
use crate::error::Result;

/// Watchlist operations for the signed-in user
#[async_trait]
pub trait WatchlistApi: Send + Sync {
    async fn watchlist(&self) -> Result<Vec<WatchlistItem>>;

    async fn add_to_watchlist(&self, symbol: &str, company: &str) -> Result<()>;

    async fn remove_from_watchlist(&self, symbol: &str) -> Result<()>;

    async fn is_in_watchlist(&self, symbol: &str) -> Result<bool>;
}
