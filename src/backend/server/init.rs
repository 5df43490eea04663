/**
 * Server Initialization
 *
 * Builds the full application: configuration, database, cache backend, the
 * read-path components, and the router. `main` only has to serve the
 * returned router.
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::cache::{PageCache, StampedeLock};
use crate::backend::messages::{
    CacheInvalidator, CachedProfileResolver, MessageReader, PgMessageStore, PgProfileResolver,
    ReadPathTimings,
};
use crate::backend::routes::create_router;

use super::config::{self, CacheSettings};
use super::state::AppState;

/// Create the complete application with all routes and state
///
/// Fails only when the database is unreachable; the cache degrades to an
/// in-process backend on its own.
pub async fn create_app() -> Result<Router, String> {
    // 1. Configuration
    let settings = CacheSettings::load();
    tracing::info!(?settings, "Loaded cache settings");

    // 2. Database (required)
    let db_pool = config::load_database()
        .await
        .ok_or_else(|| "database initialization failed; is DATABASE_URL set?".to_string())?;

    // 3. Cache backend (Redis, or in-process fallback)
    let cache_backend = config::load_cache_backend().await;

    // 4. Read-path components
    let page_cache = Arc::new(PageCache::new(
        cache_backend.clone(),
        settings.fresh_window,
        settings.grace_window,
    ));
    let lock = Arc::new(StampedeLock::new(cache_backend, settings.lock_ttl));

    let store = Arc::new(PgMessageStore::new(db_pool.clone()));
    let profiles = Arc::new(CachedProfileResolver::new(
        PgProfileResolver::new(db_pool.clone()),
        settings.profile_ttl,
    ));

    let reader = MessageReader::new(
        store,
        profiles,
        page_cache.clone(),
        lock,
        ReadPathTimings {
            wait_timeout: settings.wait_timeout,
            poll_interval: settings.poll_interval,
        },
    );
    let invalidator = CacheInvalidator::new(page_cache.clone());

    // 5. Shared state and router
    let state = AppState {
        db_pool,
        reader,
        invalidator,
        page_cache,
    };

    tracing::info!("Application initialized");
    Ok(create_router(state))
}
