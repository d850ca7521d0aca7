//! Durable client-side storage
//!
//! A small string key/value store in the spirit of browser local storage,
//! backed by SQLite. [`TokenStore`] scopes it to the single bearer-token entry.

mod sqlite;

use std::sync::Arc;

use crate::error::StorageError;

pub use sqlite::SqliteStorage;

type Result<T> = std::result::Result<T, StorageError>;

/// String key/value storage shared by everything on the same profile.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;
}

/// The persisted bearer token entry.
///
/// Only the API transport holds one of these; it is the sole writer.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Read the stored token. Empty values are treated as absent.
    pub fn load(&self) -> Result<Option<String>> {
        Ok(self
            .backend
            .get_item(&self.key)?
            .filter(|token| !token.is_empty()))
    }

    /// Overwrite the entry, or delete it when `token` is `None`.
    pub fn store(&self, token: Option<&str>) -> Result<()> {
        match token {
            Some(token) => self.backend.set_item(&self.key, token),
            None => self.backend.remove_item(&self.key),
        }
    }
}

#[cfg(test)]
pub use memory::MemoryStorage;
