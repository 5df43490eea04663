//! XFChat - Main Library
//!
//! XFChat is the read-path service for a multi-tenant chat backend. It
//! serves channel message history through a Redis-backed page cache with
//! stale-while-revalidate freshness and stampede control, falling back to
//! PostgreSQL as the source of truth.
//!
//! # Overview
//!
//! This library provides the core functionality for XFChat, including:
//! - Offset pagination through a three-tier (fresh / stale / expired) page cache
//! - A distributed TTL lock that collapses concurrent cache repopulations
//! - Anchor-relative pagination with composite `(created_at, id)` ordering
//! - Write endpoints that evict cached pages after each store commit
//!
//! # Module Structure
//!
//! The library is organized into two main modules:
//!
//! - **`shared`** - Types shared between the server and its clients
//!   - Message and page structures, sender profiles
//!   - Pagination metadata and anchor directions
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server, routes, and application state
//!   - Page cache, stampede lock, and cache backends
//!   - Message store, read orchestrator, and invalidation hooks
//!
//! # Usage
//!
//! ```rust,no_run
//! use xfchat::backend::server::init::create_app;
//!
//! # async fn example() {
//! let app = create_app().await;
//! // Use app with Axum server
//! # }
//! ```
//!
//! # Thread Safety
//!
//! All server state is thread-safe: components are shared behind `Arc`,
//! counters are atomics, and the in-process cache backend uses a `Mutex`.
//!
//! # Error Handling
//!
//! The library uses Rust's standard error handling:
//!
//! - `Result<T, E>` for fallible operations
//! - `Option<T>` for optional values
//! - The custom error type in `backend::error`

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
