//! Market data API trait

use async_trait::async_trait;

use crate::client::models::{NewsArticleDto, StockDto, StockPriceDto};
use crate::error::Result;

/// Stock and news lookups
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Search stocks; `None` lists the backend's default set
    async fn search_stocks(&self, query: Option<&str>) -> Result<Vec<StockDto>>;

    /// Current quote for one symbol
    async fn stock_price(&self, symbol: &str) -> Result<StockPriceDto>;

    /// Market news, optionally narrowed to symbols
    async fn news(&self, symbols: &[String]) -> Result<Vec<NewsArticleDto>>;
}
