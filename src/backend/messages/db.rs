//! Database operations for the message write path
//!
//! Insert, edit, and soft delete. These mutate the store directly and never
//! touch the cache; the handlers call the invalidation hooks after each of
//! these commits.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::error::ChatError;
use crate::shared::messaging::{Attachment, ChatMessage, TOMBSTONE};

/// Insert a new message
pub async fn insert_message(
    pool: &PgPool,
    channel_id: Uuid,
    sender_id: Uuid,
    content: &str,
    attachments: &[Attachment],
    reply_to: Option<Uuid>,
) -> Result<ChatMessage, ChatError> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let attachments_json = serde_json::to_value(attachments)?;

    sqlx::query(
        r#"
        INSERT INTO messages (id, channel_id, sender_id, content, attachments, reply_to, is_edited, edited_at, is_deleted, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, false, NULL, false, $7)
        "#,
    )
    .bind(id)
    .bind(channel_id)
    .bind(sender_id)
    .bind(content)
    .bind(&attachments_json)
    .bind(reply_to)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ChatMessage {
        id,
        channel_id,
        sender_id,
        content: content.to_string(),
        attachments: attachments.to_vec(),
        reply_to,
        is_edited: false,
        edited_at: None,
        is_deleted: false,
        created_at: now,
    })
}

/// Edit a message in place
///
/// Sets the new content, flips `is_edited`, and stamps `edited_at`. Returns
/// `MessageNotFound` if no live row matched.
pub async fn edit_message(
    pool: &PgPool,
    channel_id: Uuid,
    message_id: Uuid,
    content: &str,
) -> Result<(), ChatError> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE messages
        SET content = $1, is_edited = true, edited_at = $2
        WHERE id = $3 AND channel_id = $4 AND is_deleted = false
        "#,
    )
    .bind(content)
    .bind(now)
    .bind(message_id)
    .bind(channel_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ChatError::MessageNotFound { id: message_id });
    }
    Ok(())
}

/// Soft-delete a message
///
/// The row stays in place: content becomes the tombstone marker, attachments
/// are cleared, `is_deleted` is set. Pagination totals intentionally still
/// count the row.
pub async fn soft_delete_message(
    pool: &PgPool,
    channel_id: Uuid,
    message_id: Uuid,
) -> Result<(), ChatError> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET content = $1, attachments = '[]'::jsonb, is_deleted = true
        WHERE id = $2 AND channel_id = $3 AND is_deleted = false
        "#,
    )
    .bind(TOMBSTONE)
    .bind(message_id)
    .bind(channel_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ChatError::MessageNotFound { id: message_id });
    }
    Ok(())
}
