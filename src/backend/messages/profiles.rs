//! Sender Profile Resolution
//!
//! Batch-resolves sender ids to display profiles. The resolver tolerates
//! partial failure by contract: ids it cannot find are simply absent from the
//! returned map, and the reader substitutes a placeholder profile.
//!
//! `CachedProfileResolver` wraps any resolver with a small in-process TTL
//! memo. Profiles change rarely and show up on every rendered message, so a
//! plain map-behind-a-lock is enough here; this is deliberately simpler than
//! the page cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::error::ChatError;
use crate::shared::messaging::SenderProfile;

/// Batch lookup of sender display profiles
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    /// Resolve the given ids; missing ids are absent from the result map
    async fn batch_resolve(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, SenderProfile>, ChatError>;
}

/// PostgreSQL-backed profile resolver
pub struct PgProfileResolver {
    pool: PgPool,
}

impl PgProfileResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileResolver for PgProfileResolver {
    async fn batch_resolve(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, SenderProfile>, ChatError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, username, display_name, avatar_url
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let profile = SenderProfile {
                    id: row.get("id"),
                    username: row.get("username"),
                    display_name: row.get("display_name"),
                    avatar_url: row.get("avatar_url"),
                };
                (profile.id, profile)
            })
            .collect())
    }
}

struct MemoEntry {
    profile: SenderProfile,
    resolved_at: Instant,
}

/// TTL memo over another resolver
pub struct CachedProfileResolver<R> {
    inner: R,
    ttl: Duration,
    memo: RwLock<HashMap<Uuid, MemoEntry>>,
}

impl<R: ProfileResolver> CachedProfileResolver<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            memo: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<R: ProfileResolver> ProfileResolver for CachedProfileResolver<R> {
    async fn batch_resolve(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, SenderProfile>, ChatError> {
        let mut resolved = HashMap::new();
        let mut missing = Vec::new();

        {
            let memo = self.memo.read().await;
            for id in user_ids {
                match memo.get(id) {
                    Some(entry) if entry.resolved_at.elapsed() < self.ttl => {
                        resolved.insert(*id, entry.profile.clone());
                    }
                    _ => missing.push(*id),
                }
            }
        }

        if missing.is_empty() {
            return Ok(resolved);
        }

        missing.sort_unstable();
        missing.dedup();
        let fetched = self.inner.batch_resolve(&missing).await?;

        let mut memo = self.memo.write().await;
        for (id, profile) in &fetched {
            memo.insert(
                *id,
                MemoEntry {
                    profile: profile.clone(),
                    resolved_at: Instant::now(),
                },
            );
        }
        resolved.extend(fetched);

        Ok(resolved)
    }
}
