/**
 * Application State
 *
 * Shared state passed to all Axum handlers. Everything in here is cheap to
 * clone: the pool and the reader are handles over `Arc`-shared internals.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::cache::PageCache;
use crate::backend::messages::{CacheInvalidator, MessageReader};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool, the source of truth for messages
    pub db_pool: PgPool,
    /// Orchestrated read path over cache, lock, and store
    pub reader: MessageReader,
    /// Write-path cache eviction hooks
    pub invalidator: CacheInvalidator,
    /// Page cache handle, exposed for the stats endpoints
    pub page_cache: Arc<PageCache>,
}

impl FromRef<AppState> for MessageReader {
    fn from_ref(state: &AppState) -> Self {
        state.reader.clone()
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}
