//! Market data models

use serde::{Deserialize, Serialize};

/// Search hit from `/api/stocks/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDto {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Quote from `/api/stocks/price/{symbol}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPriceDto {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub current_price: f64,
    #[serde(default)]
    pub open_price: f64,
    #[serde(default)]
    pub high_price: f64,
    #[serde(default)]
    pub low_price: f64,
    #[serde(default)]
    pub previous_close: f64,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub price_change: f64,
    #[serde(default)]
    pub price_change_percent: f64,
}

/// Article from `/api/news`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticleDto {
    pub id: i64,
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    /// Publication time, seconds since epoch
    #[serde(default)]
    pub datetime: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub related: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
