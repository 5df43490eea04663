/**
 * Backend Error Types
 *
 * This module defines the error types used by the message read path and the
 * HTTP handlers. Each variant maps to an HTTP status code.
 *
 * # Error Policy
 *
 * - Store failures are the only dependency failures that propagate to the
 *   caller: with no durable data there is nothing to return.
 * - Cache and lock failures never appear here. They are degraded locally
 *   (treated as a miss, or logged and dropped) inside the cache layer.
 * - Validation errors are raised before any I/O happens.
 */

use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the message read/write path
#[derive(Debug, Error)]
pub enum ChatError {
    /// Malformed or out-of-range request parameter, rejected before any I/O
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable description of the rejected parameter
        message: String,
    },

    /// The anchor message for relative pagination does not exist
    #[error("anchor message not found: {id}")]
    AnchorNotFound { id: Uuid },

    /// The anchor message exists but belongs to a different channel
    #[error("anchor message {anchor_id} does not belong to channel {channel_id}")]
    ChannelMismatch { anchor_id: Uuid, channel_id: Uuid },

    /// The requested message does not exist
    #[error("message not found: {id}")]
    MessageNotFound { id: Uuid },

    /// The durable message store failed; fatal for the request
    #[error("message store error: {message}")]
    Store { message: String },

    /// Serialization of a response or snapshot failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChatError {
    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Self::AnchorNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ChannelMismatch { .. } => StatusCode::BAD_REQUEST,
            Self::MessageNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ChatError {
    fn from(e: sqlx::Error) -> Self {
        ChatError::Store {
            message: e.to_string(),
        }
    }
}
