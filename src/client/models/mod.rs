//! API request and response models

mod auth;
mod stock;
mod watchlist;

pub use auth::{AuthResponse, SignInFormData, SignUpFormData, User};
pub use stock::{NewsArticleDto, StockDto, StockPriceDto};
pub use watchlist::{AddWatchlistRequest, WatchlistItem};
