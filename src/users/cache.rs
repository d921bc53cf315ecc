/// User collection cache
///
/// A single collection-level entry keyed `"users"` with a short TTL sits in
/// front of the store of record. The cache is an optimization, never a
/// consistency source: every backend failure degrades to the repository and
/// is logged at warn, and mutations delete the key before reporting success.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::AppError;
use crate::users::model::User;

const USERS_KEY: &str = "users";

/// Backend failure; handled locally, never surfaced to the caller.
#[derive(Debug)]
pub struct CacheError(pub String);

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache backend error: {}", self.0)
    }
}

impl std::error::Error for CacheError {}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError(err.to_string())
    }
}

/// Key-value backend with expiry support.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;
    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

/// Redis implementation of `CacheStore`.
///
/// `ConnectionManager` multiplexes one connection and reconnects on its own,
/// so the store is cheap to clone into handlers.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
}

impl RedisCacheStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

/// Read-through cache over the whole user collection.
pub struct UserCache {
    store: Arc<dyn CacheStore>,
    ttl_seconds: u64,
}

impl UserCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    /// Return the cached collection, or populate it from `fetch_all`.
    ///
    /// An unreachable backend or an unparseable entry falls back to
    /// `fetch_all`; the triggering request never fails because of the cache.
    pub async fn read_through<F, Fut>(&self, fetch_all: F) -> Result<Vec<User>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<User>, AppError>>,
    {
        match self.store.get(USERS_KEY).await {
            Ok(Some(cached)) => match serde_json::from_str::<Vec<User>>(&cached) {
                Ok(users) => {
                    tracing::debug!(key = USERS_KEY, "cache hit");
                    return Ok(users);
                }
                Err(e) => {
                    tracing::warn!(key = USERS_KEY, error = %e, "discarding unparseable cache entry");
                }
            },
            Ok(None) => {
                tracing::debug!(key = USERS_KEY, "cache miss");
            }
            Err(e) => {
                tracing::warn!(key = USERS_KEY, error = %e, "cache unavailable, reading store of record");
            }
        }

        let users = fetch_all().await?;

        match serde_json::to_string(&users) {
            Ok(serialized) => {
                if let Err(e) = self
                    .store
                    .set_ex(USERS_KEY, &serialized, self.ttl_seconds)
                    .await
                {
                    tracing::warn!(key = USERS_KEY, error = %e, "failed to populate cache");
                }
            }
            Err(e) => {
                tracing::warn!(key = USERS_KEY, error = %e, "failed to serialize user collection");
            }
        }

        Ok(users)
    }

    /// Delete the collection entry unconditionally.
    ///
    /// Called by every create/update/delete before it reports success. A
    /// failed delete is logged at warn and swallowed; the worst case is a
    /// stale read bounded by the TTL.
    pub async fn invalidate(&self) {
        if let Err(e) = self.store.del(USERS_KEY).await {
            tracing::warn!(key = USERS_KEY, error = %e, "cache invalidation failed, staleness bounded by ttl");
        }
    }
}
