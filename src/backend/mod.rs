//! Backend Module
//!
//! This module contains all server-side code for the XFChat read-path
//! service. It provides an Axum HTTP server over the channel message store
//! with a Redis-backed page cache and stampede control on the hot read
//! path.
//!
//! # Overview
//!
//! The backend module includes:
//! - Axum HTTP server setup and configuration
//! - Cached, stampede-protected message reads
//! - Offset and anchor-relative pagination
//! - Message writes with post-commit cache invalidation
//! - Database persistence (PostgreSQL)
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`cache`** - Page cache, stampede lock, cache backends
//! - **`messages`** - Message store, read orchestrator, invalidation hooks
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary entry point
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── cache/          - Page cache and stampede lock
//! ├── messages/       - Message store and read orchestrator
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! The backend uses shared state (`AppState`) that contains:
//! - The PostgreSQL connection pool (source of truth)
//! - The orchestrated message reader
//! - The cache invalidator fired by the write path
//! - The page cache handle for the stats endpoints
//!
//! Everything in `AppState` is a cheap clone over `Arc`-shared internals.

pub mod cache;
pub mod error;
pub mod messages;
pub mod routes;
pub mod server;

pub use error::ChatError;
pub use server::state::AppState;
