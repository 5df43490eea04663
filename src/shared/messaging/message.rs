//! Channel Message Data Structures
//!
//! Represents a message in a channel, both as stored (`ChatMessage`) and as
//! rendered for clients with the sender's profile attached (`MessageView`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content placed into a message when it is soft-deleted.
///
/// Messages are never hard-deleted; the row stays in place with this marker
/// as its content and its attachments cleared.
pub const TOMBSTONE: &str = "[message deleted]";

/// File attachment metadata carried on a message
///
/// The read path treats attachments as opaque; storage and transcoding are
/// handled by the upload service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub filename: String,
    pub content_type: String,
}

/// A message as it lives in the durable store
///
/// Ordering of messages within a channel is always the composite key
/// `(created_at, id)` descending. `created_at` alone is not unique, so every
/// query that sorts or compares messages must use both fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub attachments: Vec<Attachment>,
    /// Message this one replies to, if any
    pub reply_to: Option<Uuid>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Composite ordering key: `(created_at, id)`
    pub fn ordering_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }
}

/// Display profile of a message sender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SenderProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl SenderProfile {
    /// Placeholder profile for senders the resolver could not find
    ///
    /// The profile resolver tolerates partial failure; any id absent from its
    /// result map is rendered with this stand-in rather than failing the read.
    pub fn placeholder(id: Uuid) -> Self {
        Self {
            id,
            username: "unknown".to_string(),
            display_name: None,
            avatar_url: None,
        }
    }
}

/// A message rendered for clients, with the sender profile resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub sender: SenderProfile,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub reply_to: Option<Uuid>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl MessageView {
    /// Render a stored message with its sender profile
    pub fn render(message: &ChatMessage, sender: SenderProfile) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            sender,
            content: message.content.clone(),
            attachments: message.attachments.clone(),
            reply_to: message.reply_to,
            is_edited: message.is_edited,
            edited_at: message.edited_at,
            is_deleted: message.is_deleted,
            created_at: message.created_at,
        }
    }
}
