//! In-Memory Cache Backend
//!
//! A single-process backend used by the test suite and by development runs
//! without a `REDIS_URL`. A lone mutex around the map makes
//! `set_if_absent_with_ttl` atomic without further ceremony. Expired entries
//! are dropped lazily on access.
//!
//! Not suitable for multi-instance deployments: the stampede lock only
//! excludes repopulators that share this process.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::backend::{CacheBackend, CacheError};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local cache backend
#[derive(Default)]
pub struct MemoryCacheBackend {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries, for tests
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|e| !e.is_expired()).count()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(false),
            _ => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: value.to_string(),
                        expires_at: Instant::now() + ttl,
                    },
                );
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let backend = MemoryCacheBackend::new();
        assert_eq!(backend.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let backend = MemoryCacheBackend::new();
        backend
            .set_with_ttl("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let backend = MemoryCacheBackend::new();
        backend
            .set_with_ttl("k", "v", Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_if_absent_respects_existing() {
        let backend = MemoryCacheBackend::new();
        let created = backend
            .set_if_absent_with_ttl("lock", "a", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(created);

        let created_again = backend
            .set_if_absent_with_ttl("lock", "b", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(!created_again);
        assert_eq!(backend.get("lock").await.unwrap(), Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_set_if_absent_after_expiry() {
        let backend = MemoryCacheBackend::new();
        backend
            .set_if_absent_with_ttl("lock", "a", Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let created = backend
            .set_if_absent_with_ttl("lock", "b", Duration::from_secs(10))
            .await
            .unwrap();
        assert!(created);
    }

    #[tokio::test]
    async fn test_delete_by_prefix() {
        let backend = MemoryCacheBackend::new();
        let ttl = Duration::from_secs(60);
        backend.set_with_ttl("chan:a:page:0", "x", ttl).await.unwrap();
        backend.set_with_ttl("chan:a:page:1", "y", ttl).await.unwrap();
        backend.set_with_ttl("chan:b:page:0", "z", ttl).await.unwrap();

        let removed = backend.delete_by_prefix("chan:a:").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(backend.get("chan:a:page:0").await.unwrap(), None);
        assert!(backend.get("chan:b:page:0").await.unwrap().is_some());
    }
}
