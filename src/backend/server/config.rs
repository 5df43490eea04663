/**
 * Server Configuration
 *
 * This module handles loading of server configuration from environment
 * variables: the PostgreSQL connection, the cache backend, and the
 * read-path cache windows.
 *
 * # Configuration Sources
 *
 * Everything comes from environment variables with sensible defaults for
 * local development where possible. The database is the one hard
 * requirement — it is the single source of truth for messages. The cache
 * is optional: without a `REDIS_URL` the server runs on an in-process
 * backend, which is fine for a single instance but gives no cross-instance
 * stampede protection.
 */

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::backend::cache::{CacheBackend, MemoryCacheBackend, RedisCacheBackend};

/// Cache windows and lock timings for the read path
///
/// The wait timeout should stay at or below the lock TTL; a waiting reader
/// must not block far longer than the lock could possibly be held.
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    /// Age up to which a cached page is served as-is
    pub fresh_window: Duration,
    /// Additional age during which a page is served stale while refreshed
    pub grace_window: Duration,
    /// TTL of the repopulation lock
    pub lock_ttl: Duration,
    /// How long a lock-race loser polls for the winner's result
    pub wait_timeout: Duration,
    /// Sleep between polls
    pub poll_interval: Duration,
    /// TTL of the sender-profile memo
    pub profile_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            fresh_window: Duration::from_secs(3600),
            grace_window: Duration::from_secs(60),
            lock_ttl: Duration::from_secs(10),
            wait_timeout: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(100),
            profile_ttl: Duration::from_secs(300),
        }
    }
}

fn env_secs(name: &str, default: Duration) -> Duration {
    match std::env::var(name) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                tracing::warn!("{} is not a number, using default", name);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_millis(name: &str, default: Duration) -> Duration {
    match std::env::var(name) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                tracing::warn!("{} is not a number, using default", name);
                default
            }
        },
        Err(_) => default,
    }
}

impl CacheSettings {
    /// Load cache settings from the environment
    pub fn load() -> Self {
        let defaults = Self::default();
        let settings = Self {
            fresh_window: env_secs("CACHE_FRESH_SECS", defaults.fresh_window),
            grace_window: env_secs("CACHE_GRACE_SECS", defaults.grace_window),
            lock_ttl: env_secs("LOCK_TTL_SECS", defaults.lock_ttl),
            wait_timeout: env_millis("CACHE_WAIT_MS", defaults.wait_timeout),
            poll_interval: env_millis("CACHE_POLL_MS", defaults.poll_interval),
            profile_ttl: env_secs("PROFILE_CACHE_SECS", defaults.profile_ttl),
        };

        if settings.wait_timeout > settings.lock_ttl {
            tracing::warn!(
                "CACHE_WAIT_MS ({:?}) exceeds LOCK_TTL_SECS ({:?}); waiters may outlast the lock",
                settings.wait_timeout,
                settings.lock_ttl
            );
        }

        settings
    }
}

/// Load and initialize the database connection pool
///
/// Reads `DATABASE_URL`, creates the pool, and runs migrations. Migration
/// failures are logged but do not prevent startup (they may already have
/// been applied). Returns `None` if the variable is unset or the connection
/// fails — the caller decides whether that is fatal.
pub async fn load_database() -> Option<PgPool> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::error!("DATABASE_URL not set");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => {
            tracing::info!("Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {:?}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}

/// Load the cache backend
///
/// Connects to Redis when `REDIS_URL` is set. Without it — or when the
/// connection fails — the server falls back to the in-process backend with
/// a warning: reads still work, but cached pages and stampede locks are not
/// shared across instances.
pub async fn load_cache_backend() -> Arc<dyn CacheBackend> {
    let redis_url = match std::env::var("REDIS_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("REDIS_URL not set; using in-process cache backend");
            return Arc::new(MemoryCacheBackend::new());
        }
    };

    match RedisCacheBackend::connect(&redis_url).await {
        Ok(backend) => {
            tracing::info!("Connected to Redis cache backend");
            Arc::new(backend)
        }
        Err(e) => {
            tracing::error!("Failed to connect to Redis: {}", e);
            tracing::warn!("Falling back to in-process cache backend");
            Arc::new(MemoryCacheBackend::new())
        }
    }
}
