//! Shared Types
//!
//! Types shared between the HTTP layer and the read-path core:
//! message structures, rendered views, and pagination metadata.

pub mod messaging;

pub use messaging::{
    AnchorDirection, Attachment, ChatMessage, MessagePage, MessageView, PageMeta, SenderProfile,
};
