//! Messaging HTTP Handlers
//!
//! Thin axum handlers over the read orchestrator and the write path.
//! Reads go through `MessageReader`; writes commit to the store first and
//! then fire the cache invalidation hooks. Authentication happens upstream
//! at the SSO gateway, which forwards the authenticated sender id.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::cache::CacheStats;
use crate::backend::error::ChatError;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{AnchorDirection, Attachment, ChatMessage, MessagePage};

use super::db;
use super::reader::MessageReader;

/// Longest accepted message body
const MAX_CONTENT_LENGTH: usize = 4000;

const DEFAULT_PAGE_SIZE: u32 = 50;

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Query parameters for offset pagination
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Query parameters for anchor-relative pagination
#[derive(Debug, Deserialize)]
pub struct AnchorQuery {
    pub direction: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Body of `POST /channels/{channel_id}/messages`
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub reply_to: Option<Uuid>,
}

/// Body of `PATCH /channels/{channel_id}/messages/{message_id}`
#[derive(Debug, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

/// Response for write operations that return no message body
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
}

fn validate_content(content: &str) -> Result<(), ChatError> {
    if content.trim().is_empty() {
        return Err(ChatError::invalid_argument("message content is empty"));
    }
    if content.len() > MAX_CONTENT_LENGTH {
        return Err(ChatError::invalid_argument(format!(
            "message content exceeds {} bytes",
            MAX_CONTENT_LENGTH
        )));
    }
    Ok(())
}

/// Get one page of a channel's messages, latest first
pub async fn get_channel_messages(
    State(reader): State<MessageReader>,
    Path(channel_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MessagePage>, ChatError> {
    let page = reader
        .get_messages(channel_id, query.page, query.limit)
        .await?;
    Ok(Json(page))
}

/// Get a page of messages relative to an anchor message
pub async fn get_messages_from_anchor(
    State(reader): State<MessageReader>,
    Path((channel_id, anchor_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<AnchorQuery>,
) -> Result<Json<MessagePage>, ChatError> {
    let direction = AnchorDirection::from_str(&query.direction).ok_or_else(|| {
        ChatError::invalid_argument("direction must be 'older' or 'newer'")
    })?;

    let page = reader
        .list_from_anchor(channel_id, anchor_id, direction, query.page, query.limit)
        .await?;
    Ok(Json(page))
}

/// Send a message to a channel
pub async fn send_message(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatMessage>, ChatError> {
    validate_content(&request.content)?;

    let message = db::insert_message(
        &state.db_pool,
        channel_id,
        request.sender_id,
        &request.content,
        &request.attachments,
        request.reply_to,
    )
    .await
    .map_err(|e| {
        tracing::error!(%channel_id, "failed to insert message: {}", e);
        e
    })?;

    // Eviction strictly after the commit; failures inside are logged only.
    state.invalidator.on_message_created(channel_id).await;

    Ok(Json(message))
}

/// Edit a message's content
pub async fn edit_message(
    State(state): State<AppState>,
    Path((channel_id, message_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<EditMessageRequest>,
) -> Result<Json<AckResponse>, ChatError> {
    validate_content(&request.content)?;

    db::edit_message(&state.db_pool, channel_id, message_id, &request.content).await?;
    state.invalidator.on_message_edited(channel_id).await;

    Ok(Json(AckResponse { success: true }))
}

/// Soft-delete a message
pub async fn delete_message(
    State(state): State<AppState>,
    Path((channel_id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AckResponse>, ChatError> {
    db::soft_delete_message(&state.db_pool, channel_id, message_id).await?;
    state.invalidator.on_message_deleted(channel_id).await;

    Ok(Json(AckResponse { success: true }))
}

/// Page-cache hit/miss counters
pub async fn get_cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.page_cache.stats())
}

/// Zero the page-cache counters, returning the values they had
pub async fn reset_cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    let stats = state.page_cache.stats();
    state.page_cache.reset_stats();
    Json(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_validation() {
        assert!(validate_content("hello").is_ok());
        assert!(validate_content("").is_err());
        assert!(validate_content("   ").is_err());
        assert!(validate_content(&"x".repeat(MAX_CONTENT_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_page_query_defaults() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 0);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
    }
}
