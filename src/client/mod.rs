//! OpenStock API client

pub mod api;
pub mod jwt;
pub mod models;
pub mod openstock;

pub use api::{AuthApi, MarketApi, WatchlistApi};
pub use openstock::{AuthErrorObserver, OpenStockClient};
