//! OpenStock API client implementation

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::{debug, warn};
use reqwest::{Client as HttpClient, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

use super::api::{AuthApi, MarketApi, WatchlistApi};
use super::models::{
    AddWatchlistRequest, AuthResponse, NewsArticleDto, SignInFormData, SignUpFormData, StockDto,
    StockPriceDto, User, WatchlistItem,
};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::storage::TokenStore;

/// Receives the notification that the backend rejected the held token.
///
/// Invoked after the transport has dropped its own token and before the
/// failing call returns, so the observer's state change is visible to the
/// caller's error handling.
#[async_trait]
pub trait AuthErrorObserver: Send + Sync {
    async fn on_auth_error(&self);
}

/// OpenStock API client.
///
/// Owns the bearer token: the in-memory mirror used for request headers and
/// the persisted entry are only ever written together through [`set_token`].
///
/// [`set_token`]: OpenStockClient::set_token
pub struct OpenStockClient {
    http: HttpClient,
    base_url: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    store: TokenStore,
    auth_state: RwLock<AuthState>,
    on_auth_error: RwLock<Option<Arc<dyn AuthErrorObserver>>>,
}

/// Internal authentication state
#[derive(Debug, Default)]
struct AuthState {
    token: Option<String>,
}

impl OpenStockClient {
    /// Create a client and load any persisted token into its header state.
    pub fn new(config: &Config, store: TokenStore) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.api_timeout())
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        let token = store.load()?;
        debug!(
            "API client for {} (stored token: {})",
            config.api_base_url,
            if token.is_some() { "present" } else { "none" }
        );

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            rate_limiter,
            store,
            auth_state: RwLock::new(AuthState { token }),
            on_auth_error: RwLock::new(None),
        })
    }

    /// Replace the held token, or clear it with `None`.
    ///
    /// This is the only write path for the persisted entry. A new token is
    /// held only once it has been persisted. A clear always drops the held
    /// token; the error then reports that the persisted entry survived.
    pub async fn set_token(&self, token: Option<&str>) -> Result<()> {
        let mut state = self.auth_state.write().await;
        self.write_token(&mut state, token)
    }

    fn write_token(&self, state: &mut AuthState, token: Option<&str>) -> Result<()> {
        match token {
            Some(token) => {
                self.store.store(Some(token))?;
                state.token = Some(token.to_string());
            }
            None => {
                state.token = None;
                self.store.store(None)?;
            }
        }
        Ok(())
    }

    /// The token currently attached to requests
    pub async fn token(&self) -> Option<String> {
        self.auth_state.read().await.token.clone()
    }

    /// The persisted token, read fresh from storage
    pub fn stored_token(&self) -> Result<Option<String>> {
        Ok(self.store.load()?)
    }

    /// Register the auth-error observer.
    ///
    /// Single slot: a second registration replaces the first and the
    /// replaced observer is returned.
    pub async fn set_on_auth_error(
        &self,
        observer: Arc<dyn AuthErrorObserver>,
    ) -> Option<Arc<dyn AuthErrorObserver>> {
        let previous = self.on_auth_error.write().await.replace(observer);
        if previous.is_some() {
            warn!("Replacing previously registered auth-error observer");
        }
        previous
    }

    fn url(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| ApiError::InvalidResponse(format!("Invalid request URL: {}", e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a JSON request and decode the JSON response.
    ///
    /// Empty 2xx bodies decode as `null`.
    pub async fn send<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.rate_limiter.until_ready().await;

        let url = self.url(endpoint, query)?;
        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method, url)
            .header("Content-Type", "application/json");

        let sent_token = self.token().await;
        if let Some(token) = &sent_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error_data: Value =
                serde_json::from_str(&text).unwrap_or_else(|_| Value::Object(Default::default()));
            let message = error_data
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string);

            let err = ApiError::from_status(status.as_u16(), message);
            debug!("{} failed with {}: {}", endpoint, status, err);

            if matches!(err, ApiError::Unauthorized) {
                self.handle_unauthorized(sent_token.as_deref()).await;
            }
            return Err(err.into());
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;
        let text = if text.trim().is_empty() { "null" } else { &text };

        serde_json::from_str(text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
        })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        self.send::<T, Value>(Method::GET, endpoint, query, None).await
    }

    /// Send a request whose response body is irrelevant
    async fn send_discarding<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<()> {
        let _: Value = self.send(method, endpoint, &[], body).await?;
        Ok(())
    }

    /// Drop the rejected token, then tell the observer.
    ///
    /// A 401 for a token that has since been replaced says nothing about the
    /// current one and is ignored.
    async fn handle_unauthorized(&self, rejected: Option<&str>) {
        {
            let mut state = self.auth_state.write().await;
            if state.token.as_deref() != rejected {
                debug!("Ignoring 401 for a superseded token");
                return;
            }
            if let Err(e) = self.write_token(&mut state, None) {
                warn!("Failed to clear rejected token: {}", e);
            }
        }

        let observer = self.on_auth_error.read().await.clone();
        match observer {
            Some(observer) => observer.on_auth_error().await,
            None => debug!("401 received with no auth-error observer registered"),
        }
    }
}

#[async_trait]
impl AuthApi for OpenStockClient {
    async fn sign_in(&self, data: &SignInFormData) -> Result<AuthResponse> {
        self.send(Method::POST, "/api/auth/signin", &[], Some(data))
            .await
    }

    async fn sign_up(&self, data: &SignUpFormData) -> Result<AuthResponse> {
        self.send(Method::POST, "/api/auth/signup", &[], Some(data))
            .await
    }

    async fn sign_out(&self) -> Result<()> {
        self.send_discarding::<Value>(Method::POST, "/api/auth/signout", None)
            .await?;
        self.set_token(None).await
    }

    async fn current_user(&self) -> Result<User> {
        self.get("/api/user/profile", &[]).await
    }
}

#[async_trait]
impl MarketApi for OpenStockClient {
    async fn search_stocks(&self, query: Option<&str>) -> Result<Vec<StockDto>> {
        match query.filter(|q| !q.is_empty()) {
            Some(q) => self.get("/api/stocks/search", &[("query", q)]).await,
            None => self.get("/api/stocks/search", &[]).await,
        }
    }

    async fn stock_price(&self, symbol: &str) -> Result<StockPriceDto> {
        let path = format!("/api/stocks/price/{}", symbol);
        self.get(&path, &[]).await
    }

    async fn news(&self, symbols: &[String]) -> Result<Vec<NewsArticleDto>> {
        if symbols.is_empty() {
            return self.get("/api/news", &[]).await;
        }
        let joined = symbols.join(",");
        self.get("/api/news", &[("symbols", joined.as_str())]).await
    }
}

#[async_trait]
impl WatchlistApi for OpenStockClient {
    async fn watchlist(&self) -> Result<Vec<WatchlistItem>> {
        self.get("/api/watchlist", &[]).await
    }

    async fn add_to_watchlist(&self, symbol: &str, company: &str) -> Result<()> {
        let body = AddWatchlistRequest { symbol, company };
        self.send_discarding(Method::POST, "/api/watchlist", Some(&body))
            .await
    }

    async fn remove_from_watchlist(&self, symbol: &str) -> Result<()> {
        let path = format!("/api/watchlist/{}", symbol);
        self.send_discarding::<Value>(Method::DELETE, &path, None)
            .await
    }

    async fn is_in_watchlist(&self, symbol: &str) -> Result<bool> {
        let path = format!("/api/watchlist/check/{}", symbol);
        self.get(&path, &[]).await
    }
}
