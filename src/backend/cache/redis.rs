//! Redis Cache Backend
//!
//! Production cache backend over a shared Redis instance. Both the page
//! cache and the stampede lock live here so that every server instance sees
//! the same entries and the same locks.
//!
//! `set_if_absent_with_ttl` maps to a single `SET key value NX EX ttl`
//! command, which is the atomic create-if-absent the lock requires.
//! `delete_by_prefix` walks `SCAN MATCH prefix*` and deletes the collected
//! keys; pattern invalidation is rare (edits/deletes only) so the scan cost
//! is acceptable.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::backend::{CacheBackend, CacheError};

/// Cache backend over a shared Redis instance
#[derive(Clone)]
pub struct RedisCacheBackend {
    conn: ConnectionManager,
}

impl RedisCacheBackend {
    /// Connect to Redis
    ///
    /// The `ConnectionManager` reconnects automatically; individual command
    /// failures while a reconnect is in flight come back as `CacheError` and
    /// are degraded by the callers.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", prefix);

        // Collect first: deleting while the SCAN cursor is live would need a
        // second connection anyway.
        let keys: Vec<String> = {
            let mut iter = conn.scan_match::<_, String>(&pattern).await?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if keys.is_empty() {
            return Ok(0);
        }
        let removed = keys.len() as u64;
        let _: () = conn.del(keys).await?;
        Ok(removed)
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        // SET NX EX is a single atomic command; replies nil when the key
        // already exists.
        let reply: redis::Value = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await?;
        Ok(!matches!(reply, redis::Value::Nil))
    }
}
