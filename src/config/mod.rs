//! Configuration management for OpenStock

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default backend URL when neither flag, env nor config file sets one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Storage key holding the bearer token
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "auth_token";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub api_base_url: String,

    /// Key of the persisted token entry
    pub token_storage_key: String,

    /// Per-request timeout in milliseconds
    pub api_timeout_ms: u64,

    /// Client-side request throttle
    pub requests_per_second: u32,

    /// How often an authenticated session re-fetches the profile
    pub revalidate_interval_secs: u64,

    /// How often the expiry monitor re-evaluates the token
    pub expiry_check_interval_secs: u64,

    /// Minutes before expiry at which the warning appears
    pub warning_minutes: u64,

    /// Symbols shown on the home dashboard
    pub default_symbols: Vec<String>,

    /// Override the storage database location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_string(),
            api_timeout_ms: 10_000,
            requests_per_second: 10,
            revalidate_interval_secs: 5 * 60,
            expiry_check_interval_secs: 60,
            warning_minutes: 5,
            default_symbols: [
                "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "ORCL", "CRM",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            storage_path: None,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".openstock").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply a base URL override from the CLI or environment
    pub fn with_api_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url {
            self.api_base_url = url.to_string();
        }
        self
    }

    /// Reject settings that would make the client misbehave
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::Invalid("api_base_url must not be empty".to_string()).into());
        }
        if self.token_storage_key.is_empty() {
            return Err(
                ConfigError::Invalid("token_storage_key must not be empty".to_string()).into(),
            );
        }
        if self.requests_per_second == 0 {
            return Err(
                ConfigError::Invalid("requests_per_second must be at least 1".to_string()).into(),
            );
        }
        if self.revalidate_interval_secs == 0 || self.expiry_check_interval_secs == 0 {
            return Err(ConfigError::Invalid("intervals must be non-zero".to_string()).into());
        }
        Ok(())
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    pub fn revalidate_interval(&self) -> Duration {
        Duration::from_secs(self.revalidate_interval_secs)
    }

    pub fn expiry_check_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_check_interval_secs)
    }

    pub fn warning_window(&self) -> Duration {
        Duration::from_secs(self.warning_minutes.saturating_mul(60))
    }
}
