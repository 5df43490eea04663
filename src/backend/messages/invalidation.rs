//! Cache Invalidation Hooks
//!
//! Called by the write path after each store commit. Invalidation must never
//! block or fail a write: the page cache already logs and swallows backend
//! trouble, and TTL expiry bounds the damage of a dropped eviction.
//!
//! Ordering: the hooks run strictly after the mutation is durably committed.
//! There is a known race window — a reader repopulating between the commit
//! and the eviction can cache a pre-mutation snapshot, which then lives
//! until the next write or TTL expiry. This is accepted eventual
//! consistency; the alternative (versioned compare-and-swap cache writes)
//! is not worth the complexity for chat pagination.

use std::sync::Arc;

use uuid::Uuid;

use crate::backend::cache::PageCache;

/// Write-path eviction hooks over the page cache
#[derive(Clone)]
pub struct CacheInvalidator {
    cache: Arc<PageCache>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<PageCache>) -> Self {
        Self { cache }
    }

    /// A message was created in the channel
    ///
    /// New messages surface on page 0 under latest-first ordering, so only
    /// page 0 is evicted. Deeper pages shift by one but stay within their
    /// freshness window; rebuilding them all on every send would defeat the
    /// cache.
    pub async fn on_message_created(&self, channel_id: Uuid) {
        self.cache.invalidate_page(channel_id, 0).await;
    }

    /// A message was edited
    ///
    /// The edited message can sit on any cached page, and computing which
    /// one without re-querying is unsafe. Evict the whole channel.
    pub async fn on_message_edited(&self, channel_id: Uuid) {
        self.cache.invalidate_channel(channel_id).await;
    }

    /// A message was soft-deleted
    pub async fn on_message_deleted(&self, channel_id: Uuid) {
        self.cache.invalidate_channel(channel_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::cache::MemoryCacheBackend;
    use crate::shared::messaging::PageMeta;
    use std::time::Duration;

    fn invalidator_with_cache() -> (CacheInvalidator, Arc<PageCache>) {
        let backend = Arc::new(MemoryCacheBackend::new());
        let cache = Arc::new(PageCache::new(
            backend,
            Duration::from_secs(3600),
            Duration::from_secs(60),
        ));
        (CacheInvalidator::new(cache.clone()), cache)
    }

    #[tokio::test]
    async fn test_created_evicts_only_page_zero() {
        let (invalidator, cache) = invalidator_with_cache();
        let channel = Uuid::new_v4();
        cache.set(channel, 0, &[], &PageMeta::new(0, 50, 0)).await;
        cache.set(channel, 1, &[], &PageMeta::new(1, 50, 0)).await;

        invalidator.on_message_created(channel).await;

        assert!(cache.get(channel, 0).await.is_none());
        assert!(cache.get(channel, 1).await.is_some());
    }

    #[tokio::test]
    async fn test_edited_evicts_all_pages() {
        let (invalidator, cache) = invalidator_with_cache();
        let channel = Uuid::new_v4();
        for page in 0..4 {
            cache.set(channel, page, &[], &PageMeta::new(page, 50, 0)).await;
        }

        invalidator.on_message_edited(channel).await;

        for page in 0..4 {
            assert!(cache.get(channel, page).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_deleted_leaves_other_channels_alone() {
        let (invalidator, cache) = invalidator_with_cache();
        let channel = Uuid::new_v4();
        let other = Uuid::new_v4();
        cache.set(channel, 0, &[], &PageMeta::new(0, 50, 0)).await;
        cache.set(other, 0, &[], &PageMeta::new(0, 50, 0)).await;

        invalidator.on_message_deleted(channel).await;

        assert!(cache.get(channel, 0).await.is_none());
        assert!(cache.get(other, 0).await.is_some());
    }
}
