//! Message Store Adapter
//!
//! Query seam over the durable message collection. The read path only ever
//! reads through this trait; writes go through `db.rs` and never touch the
//! cache.
//!
//! Every query orders by the composite key `(created_at, id)`. Timestamps
//! are not unique — two messages created in the same instant are routine
//! under load — and a timestamp-only comparator would skip or duplicate rows
//! at page boundaries. The anchor comparators therefore compare
//! `(created_at, id)` lexicographically on both sides.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::backend::error::ChatError;
use crate::shared::messaging::{AnchorDirection, Attachment, ChatMessage};

/// Read access to the durable message collection
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Latest-first page of a channel's messages
    async fn find_by_channel(
        &self,
        channel_id: Uuid,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, ChatError>;

    /// Total number of messages in a channel
    async fn count_by_channel(&self, channel_id: Uuid) -> Result<u64, ChatError>;

    /// Page of messages strictly older or newer than the anchor
    ///
    /// `Older` returns descending from the anchor (nearest first), `Newer`
    /// ascending. Both compare `(created_at, id)` against the anchor's key.
    async fn find_relative(
        &self,
        channel_id: Uuid,
        anchor: &ChatMessage,
        direction: AnchorDirection,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, ChatError>;

    /// Count of messages matching the anchor comparator
    async fn count_relative(
        &self,
        channel_id: Uuid,
        anchor: &ChatMessage,
        direction: AnchorDirection,
    ) -> Result<u64, ChatError>;

    /// Fetch one message by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChatMessage>, ChatError>;
}

/// PostgreSQL-backed message store
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const MESSAGE_COLUMNS: &str = "id, channel_id, sender_id, content, attachments, reply_to, is_edited, edited_at, is_deleted, created_at";

/// Map a row to a `ChatMessage`
///
/// Attachments are stored as a JSONB array; an undecodable value is treated
/// as empty rather than failing the whole page.
fn message_from_row(row: &sqlx::postgres::PgRow) -> ChatMessage {
    let attachments: Vec<Attachment> = row
        .try_get::<serde_json::Value, _>("attachments")
        .ok()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();

    ChatMessage {
        id: row.get("id"),
        channel_id: row.get("channel_id"),
        sender_id: row.get("sender_id"),
        content: row.get("content"),
        attachments,
        reply_to: row.get("reply_to"),
        is_edited: row.get("is_edited"),
        edited_at: row.get("edited_at"),
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn find_by_channel(
        &self,
        channel_id: Uuid,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE channel_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(channel_id)
        .bind(limit as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(message_from_row).collect())
    }

    async fn count_by_channel(&self, channel_id: Uuid) -> Result<u64, ChatError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM messages WHERE channel_id = $1
            "#,
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("count");
        Ok(count as u64)
    }

    async fn find_relative(
        &self,
        channel_id: Uuid,
        anchor: &ChatMessage,
        direction: AnchorDirection,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let sql = match direction {
            AnchorDirection::Older => format!(
                r#"
                SELECT {MESSAGE_COLUMNS}
                FROM messages
                WHERE channel_id = $1
                  AND (created_at < $2 OR (created_at = $2 AND id < $3))
                ORDER BY created_at DESC, id DESC
                LIMIT $4 OFFSET $5
                "#
            ),
            AnchorDirection::Newer => format!(
                r#"
                SELECT {MESSAGE_COLUMNS}
                FROM messages
                WHERE channel_id = $1
                  AND (created_at > $2 OR (created_at = $2 AND id > $3))
                ORDER BY created_at ASC, id ASC
                LIMIT $4 OFFSET $5
                "#
            ),
        };

        let rows = sqlx::query(&sql)
            .bind(channel_id)
            .bind(anchor.created_at)
            .bind(anchor.id)
            .bind(limit as i64)
            .bind(skip as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(message_from_row).collect())
    }

    async fn count_relative(
        &self,
        channel_id: Uuid,
        anchor: &ChatMessage,
        direction: AnchorDirection,
    ) -> Result<u64, ChatError> {
        let sql = match direction {
            AnchorDirection::Older => {
                r#"
                SELECT COUNT(*) AS count
                FROM messages
                WHERE channel_id = $1
                  AND (created_at < $2 OR (created_at = $2 AND id < $3))
                "#
            }
            AnchorDirection::Newer => {
                r#"
                SELECT COUNT(*) AS count
                FROM messages
                WHERE channel_id = $1
                  AND (created_at > $2 OR (created_at = $2 AND id > $3))
                "#
            }
        };

        let row = sqlx::query(sql)
            .bind(channel_id)
            .bind(anchor.created_at)
            .bind(anchor.id)
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.get("count");
        Ok(count as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChatMessage>, ChatError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(message_from_row))
    }
}
