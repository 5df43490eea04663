//! Page Cache
//!
//! Stores serialized snapshots of paginated message results keyed by
//! (channel, page), with three-tier freshness classification:
//!
//! - **fresh**: age within the fresh window; served as-is.
//! - **stale**: past the fresh window but inside the grace window; served
//!   while a background refresh runs.
//! - **expired**: past fresh + grace; reported as absent even if the physical
//!   record has not been reaped yet.
//!
//! Entries are written with a physical TTL of fresh + grace so the record
//! outlives its fresh classification exactly long enough to serve stale
//! reads. Every backend failure here degrades: a failed read is a miss, a
//! failed write or invalidation is logged and dropped. The cache is an
//! optimization, never a correctness dependency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::backend::CacheBackend;
use crate::shared::messaging::{MessagePage, MessageView, PageMeta};

/// Freshness classification of a cached page
///
/// Derived from `now - cached_at` at read time, never stored. Expired
/// entries have no variant here; they are reported as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Serialized snapshot of one page of rendered messages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedPage {
    pub items: Vec<MessageView>,
    pub meta: PageMeta,
    pub cached_at: DateTime<Utc>,
}

impl CachedPage {
    /// Drop the caching timestamp and return the client-facing page
    pub fn into_page(self) -> MessagePage {
        MessagePage {
            items: self.items,
            meta: self.meta,
        }
    }
}

/// Snapshot of the cache's hit counters
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub stale_hits: u64,
    pub misses: u64,
}

/// Cache of paginated channel-message results
///
/// Counters are owned by the instance (not process globals) so tests can
/// construct isolated caches and reset them at will.
pub struct PageCache {
    backend: Arc<dyn CacheBackend>,
    fresh_window: Duration,
    grace_window: Duration,
    hits: AtomicU64,
    stale_hits: AtomicU64,
    misses: AtomicU64,
}

impl PageCache {
    pub fn new(backend: Arc<dyn CacheBackend>, fresh_window: Duration, grace_window: Duration) -> Self {
        Self {
            backend,
            fresh_window,
            grace_window,
            hits: AtomicU64::new(0),
            stale_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache key for one (channel, page) entry
    fn page_key(channel_id: Uuid, page: u32) -> String {
        format!("messages:{}:page:{}", channel_id, page)
    }

    /// Key prefix shared by all page entries of a channel
    fn channel_prefix(channel_id: Uuid) -> String {
        format!("messages:{}:page:", channel_id)
    }

    /// Classify an entry by age; `None` means expired
    fn classify(&self, cached_at: DateTime<Utc>) -> Option<Freshness> {
        let age = Utc::now()
            .signed_duration_since(cached_at)
            .to_std()
            // A cached_at in the future means clock skew; count it as new.
            .unwrap_or(Duration::ZERO);

        if age <= self.fresh_window {
            Some(Freshness::Fresh)
        } else if age <= self.fresh_window + self.grace_window {
            Some(Freshness::Stale)
        } else {
            None
        }
    }

    /// Look up a cached page
    ///
    /// Returns the snapshot plus its freshness, or `None` for missing and
    /// expired entries alike. Backend failures are logged and reported as a
    /// miss so the caller falls through to the store.
    pub async fn get(&self, channel_id: Uuid, page: u32) -> Option<(CachedPage, Freshness)> {
        let key = Self::page_key(channel_id, page);

        let raw = match self.backend.get(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%channel_id, page, "page cache read failed, treating as miss: {}", e);
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        let Some(raw) = raw else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let cached: CachedPage = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                // Unreadable snapshot, most likely from an older serialization
                // layout. Treat as a miss; repopulation overwrites it.
                tracing::warn!(%channel_id, page, "discarding undecodable cached page: {}", e);
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        match self.classify(cached.cached_at) {
            Some(Freshness::Fresh) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some((cached, Freshness::Fresh))
            }
            Some(Freshness::Stale) => {
                self.stale_hits.fetch_add(1, Ordering::Relaxed);
                Some((cached, Freshness::Stale))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a page snapshot, stamping `cached_at` with the current time
    ///
    /// Failures are logged and dropped; the caller already has the data and
    /// must not fail because the cache write did.
    pub async fn set(&self, channel_id: Uuid, page: u32, items: &[MessageView], meta: &PageMeta) {
        let cached = CachedPage {
            items: items.to_vec(),
            meta: meta.clone(),
            cached_at: Utc::now(),
        };
        let raw = match serde_json::to_string(&cached) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(%channel_id, page, "failed to serialize page snapshot: {}", e);
                return;
            }
        };

        let ttl = self.fresh_window + self.grace_window;
        let key = Self::page_key(channel_id, page);
        if let Err(e) = self.backend.set_with_ttl(&key, &raw, ttl).await {
            tracing::warn!(%channel_id, page, "page cache write failed: {}", e);
        }
    }

    /// Remove one page entry; no-op if absent
    pub async fn invalidate_page(&self, channel_id: Uuid, page: u32) {
        let key = Self::page_key(channel_id, page);
        if let Err(e) = self.backend.delete(&key).await {
            tracing::warn!(%channel_id, page, "page invalidation failed: {}", e);
        }
    }

    /// Remove every cached page of a channel
    pub async fn invalidate_channel(&self, channel_id: Uuid) {
        let prefix = Self::channel_prefix(channel_id);
        match self.backend.delete_by_prefix(&prefix).await {
            Ok(removed) => {
                tracing::debug!(%channel_id, removed, "invalidated channel pages");
            }
            Err(e) => {
                tracing::warn!(%channel_id, "channel invalidation failed: {}", e);
            }
        }
    }

    /// Snapshot of the hit/miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            stale_hits: self.stale_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Zero the hit/miss counters
    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.stale_hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
