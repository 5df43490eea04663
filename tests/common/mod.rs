//! Common test utilities and helpers
//!
//! In-memory doubles for the message store and profile resolver, fixture
//! builders, and a pre-wired read path over the in-process cache backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use xfchat::backend::cache::{MemoryCacheBackend, PageCache, StampedeLock};
use xfchat::backend::error::ChatError;
use xfchat::backend::messages::{MessageReader, MessageStore, ProfileResolver, ReadPathTimings};
use xfchat::shared::messaging::{AnchorDirection, ChatMessage, SenderProfile};

/// Build a message at an explicit timestamp with a fixed id
pub fn message_with_id(
    channel_id: Uuid,
    id: Uuid,
    sender_id: Uuid,
    created_at: DateTime<Utc>,
) -> ChatMessage {
    ChatMessage {
        id,
        channel_id,
        sender_id,
        content: format!("message {}", id),
        attachments: vec![],
        reply_to: None,
        is_edited: false,
        edited_at: None,
        is_deleted: false,
        created_at,
    }
}

/// Build a message at an explicit timestamp
pub fn message_at(channel_id: Uuid, sender_id: Uuid, created_at: DateTime<Utc>) -> ChatMessage {
    message_with_id(channel_id, Uuid::new_v4(), sender_id, created_at)
}

/// A fixed base timestamp so tests can place messages deterministically
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// In-memory message store with the same composite ordering as Postgres
///
/// Counts `find_by_channel` calls so tests can assert whether a read was
/// served from cache or hit the store.
#[derive(Default)]
pub struct MemoryMessageStore {
    messages: Mutex<Vec<ChatMessage>>,
    find_calls: AtomicU64,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: ChatMessage) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
    }

    pub fn find_calls(&self) -> u64 {
        self.find_calls.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn find_by_channel(
        &self,
        channel_id: Uuid,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let mut messages: Vec<_> = self
            .snapshot()
            .into_iter()
            .filter(|m| m.channel_id == channel_id)
            .collect();
        messages.sort_by(|a, b| b.ordering_key().cmp(&a.ordering_key()));
        Ok(messages
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_by_channel(&self, channel_id: Uuid) -> Result<u64, ChatError> {
        Ok(self
            .snapshot()
            .iter()
            .filter(|m| m.channel_id == channel_id)
            .count() as u64)
    }

    async fn find_relative(
        &self,
        channel_id: Uuid,
        anchor: &ChatMessage,
        direction: AnchorDirection,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let key = anchor.ordering_key();
        let mut messages: Vec<_> = self
            .snapshot()
            .into_iter()
            .filter(|m| {
                m.channel_id == channel_id
                    && match direction {
                        AnchorDirection::Older => m.ordering_key() < key,
                        AnchorDirection::Newer => m.ordering_key() > key,
                    }
            })
            .collect();
        match direction {
            AnchorDirection::Older => {
                messages.sort_by(|a, b| b.ordering_key().cmp(&a.ordering_key()))
            }
            AnchorDirection::Newer => {
                messages.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()))
            }
        }
        Ok(messages
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_relative(
        &self,
        channel_id: Uuid,
        anchor: &ChatMessage,
        direction: AnchorDirection,
    ) -> Result<u64, ChatError> {
        let key = anchor.ordering_key();
        Ok(self
            .snapshot()
            .iter()
            .filter(|m| {
                m.channel_id == channel_id
                    && match direction {
                        AnchorDirection::Older => m.ordering_key() < key,
                        AnchorDirection::Newer => m.ordering_key() > key,
                    }
            })
            .count() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChatMessage>, ChatError> {
        Ok(self.snapshot().into_iter().find(|m| m.id == id))
    }
}

/// Store double whose every query fails
pub struct FailingMessageStore;

#[async_trait]
impl MessageStore for FailingMessageStore {
    async fn find_by_channel(
        &self,
        _channel_id: Uuid,
        _skip: u64,
        _limit: u32,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        Err(ChatError::store("simulated store outage"))
    }

    async fn count_by_channel(&self, _channel_id: Uuid) -> Result<u64, ChatError> {
        Err(ChatError::store("simulated store outage"))
    }

    async fn find_relative(
        &self,
        _channel_id: Uuid,
        _anchor: &ChatMessage,
        _direction: AnchorDirection,
        _skip: u64,
        _limit: u32,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        Err(ChatError::store("simulated store outage"))
    }

    async fn count_relative(
        &self,
        _channel_id: Uuid,
        _anchor: &ChatMessage,
        _direction: AnchorDirection,
    ) -> Result<u64, ChatError> {
        Err(ChatError::store("simulated store outage"))
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<ChatMessage>, ChatError> {
        Err(ChatError::store("simulated store outage"))
    }
}

/// Resolver backed by a fixed map; unknown ids stay unresolved
#[derive(Default)]
pub struct StaticProfileResolver {
    profiles: HashMap<Uuid, SenderProfile>,
}

impl StaticProfileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: SenderProfile) -> Self {
        self.profiles.insert(profile.id, profile);
        self
    }
}

#[async_trait]
impl ProfileResolver for StaticProfileResolver {
    async fn batch_resolve(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, SenderProfile>, ChatError> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.profiles.get(id).map(|p| (*id, p.clone())))
            .collect())
    }
}

/// A fully wired read path over the in-process cache backend
pub struct ReadHarness {
    pub store: Arc<MemoryMessageStore>,
    pub cache: Arc<PageCache>,
    pub lock: Arc<StampedeLock>,
    pub reader: MessageReader,
}

/// Wire a reader with the given cache windows and wait timings
pub fn read_harness(
    fresh_window: Duration,
    grace_window: Duration,
    timings: ReadPathTimings,
) -> ReadHarness {
    let backend = Arc::new(MemoryCacheBackend::new());
    let store = Arc::new(MemoryMessageStore::new());
    let cache = Arc::new(PageCache::new(backend.clone(), fresh_window, grace_window));
    let lock = Arc::new(StampedeLock::new(backend, Duration::from_secs(10)));
    let reader = MessageReader::new(
        store.clone(),
        Arc::new(StaticProfileResolver::new()),
        cache.clone(),
        lock.clone(),
        timings,
    );
    ReadHarness {
        store,
        cache,
        lock,
        reader,
    }
}

/// Harness with long windows, for tests that never want entries to go stale
pub fn fresh_harness() -> ReadHarness {
    read_harness(
        Duration::from_secs(3600),
        Duration::from_secs(60),
        ReadPathTimings::default(),
    )
}
