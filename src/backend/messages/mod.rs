//! Channel Message Read and Write Path
//!
//! - **`store`** - `MessageStore` trait (query seam over the durable message
//!   collection) and its PostgreSQL implementation.
//! - **`db`** - Write-path database operations (insert, edit, soft delete).
//! - **`profiles`** - Sender profile resolution with an in-process TTL memo.
//! - **`reader`** - The read orchestrator: cached offset pagination with
//!   stale-while-revalidate and stampede control, plus anchor-relative
//!   pagination.
//! - **`invalidation`** - Cache eviction hooks the write path calls after
//!   each commit.
//! - **`handlers`** - HTTP handlers over the above.

pub mod db;
pub mod handlers;
pub mod invalidation;
pub mod profiles;
pub mod reader;
pub mod store;

pub use invalidation::CacheInvalidator;
pub use profiles::{CachedProfileResolver, PgProfileResolver, ProfileResolver};
pub use reader::{MessageReader, ReadPathTimings};
pub use store::{MessageStore, PgMessageStore};
