//! Read-Path Caching
//!
//! This module contains the caching side of the message read path:
//!
//! - **`backend`** - Minimal key-value primitives every cache store must
//!   provide (get, set-with-TTL, delete, delete-by-prefix, atomic
//!   set-if-absent). The page cache and the stampede lock both sit on top of
//!   this seam.
//! - **`redis`** - Production backend over a shared Redis instance. The lock
//!   is only meaningful across horizontally-scaled server instances when it
//!   lives in a store all instances share, so Redis is the deployment
//!   default.
//! - **`memory`** - In-process backend for tests and single-instance
//!   development.
//! - **`page_cache`** - Serialized page snapshots with three-tier freshness
//!   classification (fresh / stale / expired) and resettable hit counters.
//! - **`lock`** - Per-(channel, page) TTL'd mutual exclusion gating cache
//!   repopulation, plus the polling wait used by lock-race losers.
//!
//! The cache is strictly an optimization: any backend failure is logged and
//! degraded (reads fall through to the store, writes are dropped). Nothing in
//! this module surfaces an error to an API consumer.

pub mod backend;
pub mod lock;
pub mod memory;
pub mod page_cache;
pub mod redis;

pub use backend::{CacheBackend, CacheError};
pub use lock::StampedeLock;
pub use memory::MemoryCacheBackend;
pub use page_cache::{CacheStats, CachedPage, Freshness, PageCache};
pub use redis::RedisCacheBackend;
