//! Stampede Lock
//!
//! Per-(channel, page) mutual exclusion gating the cache-miss repopulation
//! path. Without it, N concurrent requests for a cold page would all run the
//! same store query at once (thundering herd); with it, one request
//! repopulates while the rest poll the cache and fall back to a direct fetch
//! if the wait times out.
//!
//! The lock is a TTL'd key in the shared cache backend, created with an
//! atomic set-if-absent. It must live in the shared store, not in process
//! memory, because multiple server instances race for the same pages. If a
//! holder crashes without releasing, TTL expiry self-heals the key.
//!
//! `wait_for_cache` uses fixed-interval polling on purpose. Pagination cache
//! contention is low and the poll sleeps yield the executor; a pub/sub wait
//! channel would buy little here.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use uuid::Uuid;

use super::backend::CacheBackend;
use super::page_cache::{CachedPage, Freshness, PageCache};

/// Distributed repopulation lock for cached pages
pub struct StampedeLock {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl StampedeLock {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// Lock key for one (channel, page)
    ///
    /// Deliberately outside the `messages:{channel}:page:` prefix so channel
    /// invalidation never deletes a live lock.
    fn lock_key(channel_id: Uuid, page: u32) -> String {
        format!("lock:messages:{}:{}", channel_id, page)
    }

    /// Try to become the repopulator for a page
    ///
    /// Returns `true` iff this call created the lock. A backend failure is
    /// treated as "not acquired" so the caller degrades into the wait path
    /// instead of deadlocking or double-fetching unboundedly.
    pub async fn acquire(&self, channel_id: Uuid, page: u32) -> bool {
        let key = Self::lock_key(channel_id, page);
        let holder_stamp = Utc::now().to_rfc3339();
        match self
            .backend
            .set_if_absent_with_ttl(&key, &holder_stamp, self.ttl)
            .await
        {
            Ok(acquired) => acquired,
            Err(e) => {
                tracing::warn!(%channel_id, page, "lock acquire failed, treating as busy: {}", e);
                false
            }
        }
    }

    /// Release the lock
    ///
    /// Must be called by the holder on every exit path of repopulation,
    /// success or failure. A failed delete is logged only; TTL expiry covers
    /// the leak.
    pub async fn release(&self, channel_id: Uuid, page: u32) {
        let key = Self::lock_key(channel_id, page);
        if let Err(e) = self.backend.delete(&key).await {
            tracing::warn!(%channel_id, page, "lock release failed, relying on TTL: {}", e);
        }
    }

    /// Poll the page cache until a fresh entry appears or the wait times out
    ///
    /// Only a *fresh* entry counts: the waiter is here because the page was
    /// absent or expired, so a stale leftover is not an answer. Each
    /// iteration sleeps `poll_interval` (yielding the executor) before
    /// re-checking. Returns `None` on timeout.
    pub async fn wait_for_cache(
        &self,
        cache: &PageCache,
        channel_id: Uuid,
        page: u32,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> Option<CachedPage> {
        let deadline = Instant::now() + max_wait;
        loop {
            tokio::time::sleep(poll_interval).await;

            if let Some((cached, Freshness::Fresh)) = cache.get(channel_id, page).await {
                return Some(cached);
            }

            if Instant::now() >= deadline {
                tracing::debug!(%channel_id, page, "gave up waiting for repopulated page");
                return None;
            }
        }
    }
}
