//! Backend Error Types
//!
//! Error types for the HTTP handlers and the read-path core, plus their
//! conversion into HTTP responses.

pub mod conversion;
pub mod types;

pub use types::ChatError;
