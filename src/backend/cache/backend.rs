//! Cache Backend Primitives
//!
//! The minimal key-value contract the page cache and stampede lock require.
//! Implementations: `RedisCacheBackend` (deployment) and
//! `MemoryCacheBackend` (tests, single-instance development).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to the cache store
///
/// Never surfaced to API consumers. Callers treat a failed `get` as a miss
/// and log-and-drop failed writes.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {message}")]
    Unavailable { message: String },
}

impl CacheError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<::redis::RedisError> for CacheError {
    fn from(e: ::redis::RedisError) -> Self {
        CacheError::Unavailable {
            message: e.to_string(),
        }
    }
}

/// Key-value primitives required by the read-path cache
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a value; `None` if the key is absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value with a time-to-live
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a key; no-op if absent
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key starting with `prefix`, returning how many went away
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

    /// Atomically create a key with a TTL iff it does not already exist
    ///
    /// Returns `true` iff this call created the key. This must be a single
    /// atomic operation on the backend; a check-then-set sequence would race
    /// between concurrent repopulators.
    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError>;
}
