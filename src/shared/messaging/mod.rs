//! Messaging Types
//!
//! Data structures for channel messages and their rendered, paginated form.

pub mod message;
pub mod page;

pub use message::{Attachment, ChatMessage, MessageView, SenderProfile, TOMBSTONE};
pub use page::{AnchorDirection, MessagePage, PageMeta};
