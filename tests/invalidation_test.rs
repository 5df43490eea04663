//! Write-path invalidation tests
//!
//! Run the eviction hooks against a reader-populated cache and observe what
//! the next read does: a created message forces only page 0 back to the
//! store, while edits and deletes rebuild every page of the channel.

mod common;

use uuid::Uuid;

use xfchat::backend::messages::CacheInvalidator;

use common::{base_time, fresh_harness, message_at};

#[tokio::test]
async fn test_created_refetches_only_page_zero() {
    let harness = fresh_harness();
    let invalidator = CacheInvalidator::new(harness.cache.clone());
    let channel = Uuid::new_v4();
    let sender = Uuid::new_v4();
    for i in 0..4 {
        harness
            .store
            .push(message_at(channel, sender, base_time() + chrono::Duration::seconds(i)));
    }

    // Warm pages 0 and 1.
    harness.reader.get_messages(channel, 0, 2).await.unwrap();
    harness.reader.get_messages(channel, 1, 2).await.unwrap();
    assert_eq!(harness.store.find_calls(), 2);

    harness
        .store
        .push(message_at(channel, sender, base_time() + chrono::Duration::seconds(10)));
    invalidator.on_message_created(channel).await;

    // Page 0 misses and picks up the new message; page 1 stays cached.
    let page0 = harness.reader.get_messages(channel, 0, 2).await.unwrap();
    let page1 = harness.reader.get_messages(channel, 1, 2).await.unwrap();

    assert_eq!(harness.store.find_calls(), 3);
    assert_eq!(page0.meta.total, 5);
    // The stale deeper page still reports the old total until it expires.
    assert_eq!(page1.meta.total, 4);
}

#[tokio::test]
async fn test_edit_refetches_every_page() {
    let harness = fresh_harness();
    let invalidator = CacheInvalidator::new(harness.cache.clone());
    let channel = Uuid::new_v4();
    let sender = Uuid::new_v4();
    for i in 0..4 {
        harness
            .store
            .push(message_at(channel, sender, base_time() + chrono::Duration::seconds(i)));
    }

    harness.reader.get_messages(channel, 0, 2).await.unwrap();
    harness.reader.get_messages(channel, 1, 2).await.unwrap();

    invalidator.on_message_edited(channel).await;

    harness.reader.get_messages(channel, 0, 2).await.unwrap();
    harness.reader.get_messages(channel, 1, 2).await.unwrap();

    // Both reads after the edit went back to the store.
    assert_eq!(harness.store.find_calls(), 4);
}

#[tokio::test]
async fn test_delete_spares_other_channels() {
    let harness = fresh_harness();
    let invalidator = CacheInvalidator::new(harness.cache.clone());
    let channel = Uuid::new_v4();
    let other = Uuid::new_v4();
    let sender = Uuid::new_v4();
    harness.store.push(message_at(channel, sender, base_time()));
    harness.store.push(message_at(other, sender, base_time()));

    harness.reader.get_messages(channel, 0, 50).await.unwrap();
    harness.reader.get_messages(other, 0, 50).await.unwrap();

    invalidator.on_message_deleted(channel).await;

    assert!(harness.cache.get(channel, 0).await.is_none());
    assert!(harness.cache.get(other, 0).await.is_some());
}

#[tokio::test]
async fn test_invalidator_is_cloneable_across_tasks() {
    let harness = fresh_harness();
    let invalidator = CacheInvalidator::new(harness.cache.clone());
    let channel = Uuid::new_v4();
    harness
        .store
        .push(message_at(channel, Uuid::new_v4(), base_time()));
    harness.reader.get_messages(channel, 0, 50).await.unwrap();

    let cloned = invalidator.clone();
    let handle = tokio::spawn(async move {
        cloned.on_message_edited(channel).await;
    });
    handle.await.unwrap();

    assert!(harness.cache.get(channel, 0).await.is_none());
}

#[tokio::test]
async fn test_eviction_on_empty_cache_is_harmless() {
    let harness = fresh_harness();
    let invalidator = CacheInvalidator::new(harness.cache.clone());
    let channel = Uuid::new_v4();

    // Nothing cached yet; hooks must be no-ops, not errors.
    invalidator.on_message_created(channel).await;
    invalidator.on_message_deleted(channel).await;

    assert!(harness.cache.get(channel, 0).await.is_none());
}
