//! Display model implementations for table and JSON output
//!
//! Display models transform API response types into CLI-friendly formats
//! with appropriate column names and serialization.

mod news;
mod quote;
mod stock;
mod watchlist;

pub use news::NewsDisplay;
pub use quote::QuoteDisplay;
pub use stock::StockDisplay;
pub use watchlist::WatchlistDisplay;
