//! Read Orchestrator
//!
//! Ties the page cache, the stampede lock, the message store, and the
//! profile resolver together behind the two read operations:
//!
//! - `get_messages` - offset pagination through the cache, with
//!   stale-while-revalidate and stampede control. Outcomes for one call:
//!   - cache hit, fresh: return immediately.
//!   - cache hit, stale: return immediately, spawn a background refresh.
//!   - miss, lock won: re-check the cache (a racer may have filled it),
//!     otherwise query the store, populate the cache, release the lock on
//!     every path.
//!   - miss, lock busy: poll the cache for the winner's result; on timeout,
//!     do the fetch directly without the lock. Duplicate work under heavy
//!     contention is the accepted safety valve for bounded latency.
//! - `list_from_anchor` - relative pagination around an anchor message,
//!   uncached. Uses composite `(created_at, id)` comparators so messages
//!   sharing a timestamp are neither skipped nor duplicated.
//!
//! Only store failures propagate out of here. Cache and lock trouble
//! degrades to direct store reads inside the cache layer itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::backend::cache::{Freshness, PageCache, StampedeLock};
use crate::backend::error::ChatError;
use crate::shared::messaging::{
    AnchorDirection, ChatMessage, MessagePage, MessageView, PageMeta, SenderProfile,
};

use super::profiles::ProfileResolver;
use super::store::MessageStore;

/// Largest page size a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Wall-clock bounds for the lock-busy wait path
///
/// The wait timeout stays below the lock TTL so a waiting reader never
/// outwaits the longest time the lock could possibly be held.
#[derive(Debug, Clone, Copy)]
pub struct ReadPathTimings {
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ReadPathTimings {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Orchestrated read access to channel messages
#[derive(Clone)]
pub struct MessageReader {
    store: Arc<dyn MessageStore>,
    profiles: Arc<dyn ProfileResolver>,
    cache: Arc<PageCache>,
    lock: Arc<StampedeLock>,
    timings: ReadPathTimings,
}

impl MessageReader {
    pub fn new(
        store: Arc<dyn MessageStore>,
        profiles: Arc<dyn ProfileResolver>,
        cache: Arc<PageCache>,
        lock: Arc<StampedeLock>,
        timings: ReadPathTimings,
    ) -> Self {
        Self {
            store,
            profiles,
            cache,
            lock,
            timings,
        }
    }

    /// Get one page of a channel's messages, latest first
    pub async fn get_messages(
        &self,
        channel_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<MessagePage, ChatError> {
        validate_limit(limit)?;

        // Serve from cache when possible; stale entries are served too, with
        // a refresh running behind the response.
        match self.cache.get(channel_id, page).await {
            Some((cached, Freshness::Fresh)) => {
                return Ok(cached.into_page());
            }
            Some((cached, Freshness::Stale)) => {
                self.spawn_background_refresh(channel_id, page, limit);
                return Ok(cached.into_page());
            }
            None => {}
        }

        if self.lock.acquire(channel_id, page).await {
            self.repopulate_holding_lock(channel_id, page, limit).await
        } else {
            self.wait_then_fallback(channel_id, page, limit).await
        }
    }

    /// Miss path for the lock winner: double-check, fetch, populate, release
    async fn repopulate_holding_lock(
        &self,
        channel_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<MessagePage, ChatError> {
        // Double-check: another request (or a writer-triggered refresh) may
        // have filled the page between our miss and the acquire.
        if let Some((cached, Freshness::Fresh)) = self.cache.get(channel_id, page).await {
            self.lock.release(channel_id, page).await;
            return Ok(cached.into_page());
        }

        // The lock must be released on every exit path, so hold the fetch
        // result and release before propagating any error.
        let fetched = self.fetch_page(channel_id, page, limit).await;
        if let Ok(page_data) = &fetched {
            self.cache
                .set(channel_id, page, &page_data.items, &page_data.meta)
                .await;
        }
        self.lock.release(channel_id, page).await;
        fetched
    }

    /// Miss path for lock losers: poll for the winner's page, then fetch
    /// directly if the wait times out
    async fn wait_then_fallback(
        &self,
        channel_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<MessagePage, ChatError> {
        if let Some(cached) = self
            .lock
            .wait_for_cache(
                &self.cache,
                channel_id,
                page,
                self.timings.wait_timeout,
                self.timings.poll_interval,
            )
            .await
        {
            return Ok(cached.into_page());
        }

        tracing::debug!(%channel_id, page, "wait for repopulation timed out, fetching directly");
        let page_data = self.fetch_page(channel_id, page, limit).await?;
        self.cache
            .set(channel_id, page, &page_data.items, &page_data.meta)
            .await;
        Ok(page_data)
    }

    /// Refresh a stale page without blocking or faulting the serving request
    fn spawn_background_refresh(&self, channel_id: Uuid, page: u32, limit: u32) {
        let reader = self.clone();
        tokio::spawn(async move {
            match reader.fetch_page(channel_id, page, limit).await {
                Ok(page_data) => {
                    reader
                        .cache
                        .set(channel_id, page, &page_data.items, &page_data.meta)
                        .await;
                    tracing::debug!(%channel_id, page, "background refresh completed");
                }
                Err(e) => {
                    tracing::warn!(%channel_id, page, "background refresh failed: {}", e);
                }
            }
        });
    }

    /// Query the store and resolve profiles for one offset page
    async fn fetch_page(
        &self,
        channel_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<MessagePage, ChatError> {
        let skip = page as u64 * limit as u64;
        let messages = self.store.find_by_channel(channel_id, skip, limit).await?;
        let total = self.store.count_by_channel(channel_id).await?;

        let profiles = self.resolve_profiles(&messages, None).await?;
        let items = render_views(&messages, &profiles);
        let meta = PageMeta::new(page, limit, total);

        Ok(MessagePage { items, meta })
    }

    /// Get a page of messages relative to an anchor message
    ///
    /// `older` pages are returned oldest-to-newest so a client rendering
    /// top-to-bottom can append them directly; on page 0 the anchor itself is
    /// appended as the final element, putting it at the bottom of the
    /// initially loaded window.
    pub async fn list_from_anchor(
        &self,
        channel_id: Uuid,
        anchor_id: Uuid,
        direction: AnchorDirection,
        page: u32,
        limit: u32,
    ) -> Result<MessagePage, ChatError> {
        validate_limit(limit)?;

        let anchor = self
            .store
            .find_by_id(anchor_id)
            .await?
            .ok_or(ChatError::AnchorNotFound { id: anchor_id })?;

        if anchor.channel_id != channel_id {
            return Err(ChatError::ChannelMismatch {
                anchor_id,
                channel_id,
            });
        }

        let skip = page as u64 * limit as u64;
        let messages = self
            .store
            .find_relative(channel_id, &anchor, direction, skip, limit)
            .await?;
        let direction_total = self
            .store
            .count_relative(channel_id, &anchor, direction)
            .await?;

        // The anchor's sender joins the batch even when the anchor is not in
        // the find result, so the page-0 append below always has a profile.
        let profiles = self.resolve_profiles(&messages, Some(anchor.sender_id)).await?;
        let mut items = render_views(&messages, &profiles);

        if direction == AnchorDirection::Older {
            items.reverse();
            if page == 0 {
                let sender = sender_or_placeholder(&profiles, anchor.sender_id);
                items.push(MessageView::render(&anchor, sender));
            }
        }

        let meta = PageMeta::new(page, limit, direction_total);
        Ok(MessagePage { items, meta })
    }

    /// Batch-resolve the distinct sender ids of a message slice
    async fn resolve_profiles(
        &self,
        messages: &[ChatMessage],
        extra: Option<Uuid>,
    ) -> Result<HashMap<Uuid, SenderProfile>, ChatError> {
        let mut sender_ids: Vec<Uuid> = messages.iter().map(|m| m.sender_id).collect();
        if let Some(extra) = extra {
            sender_ids.push(extra);
        }
        sender_ids.sort_unstable();
        sender_ids.dedup();

        self.profiles.batch_resolve(&sender_ids).await
    }
}

fn validate_limit(limit: u32) -> Result<(), ChatError> {
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(ChatError::invalid_argument(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

fn sender_or_placeholder(
    profiles: &HashMap<Uuid, SenderProfile>,
    sender_id: Uuid,
) -> SenderProfile {
    profiles
        .get(&sender_id)
        .cloned()
        .unwrap_or_else(|| SenderProfile::placeholder(sender_id))
}

fn render_views(
    messages: &[ChatMessage],
    profiles: &HashMap<Uuid, SenderProfile>,
) -> Vec<MessageView> {
    messages
        .iter()
        .map(|message| {
            let sender = sender_or_placeholder(profiles, message.sender_id);
            MessageView::render(message, sender)
        })
        .collect()
}
