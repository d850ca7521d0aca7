//! API trait definitions split by responsibility
//!
//! This module organizes the OpenStock API surface into focused sub-traits:
//! - [`AuthApi`] - Sign-in, sign-up, sign-out and profile
//! - [`MarketApi`] - Stock search, quotes and news
//! - [`WatchlistApi`] - The signed-in user's watchlist

mod auth;
mod market;
mod watchlist;

pub use auth::AuthApi;
pub use market::MarketApi;
pub use watchlist::WatchlistApi;
