//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs             - Module exports and documentation
//! ├── router.rs          - Main router creation
//! └── message_routes.rs  - Channel message endpoints
//! ```
//!
//! # Route Types
//!
//! ## Message Routes
//!
//! - `GET /channels/{channel_id}/messages` - Page of messages, latest first
//! - `GET /channels/{channel_id}/messages/anchor/{anchor_id}` - Anchor-relative page
//! - `POST /channels/{channel_id}/messages` - Send a message
//! - `PATCH /channels/{channel_id}/messages/{message_id}` - Edit a message
//! - `DELETE /channels/{channel_id}/messages/{message_id}` - Soft-delete a message
//!
//! ## Operational Routes
//!
//! - `GET /cache/stats` - Page-cache hit/miss counters
//! - `POST /cache/stats/reset` - Zero the counters
//! - `GET /health` - Liveness probe

/// Main router creation
pub mod router;

/// Channel message route handlers
pub mod message_routes;

pub use router::create_router;
