use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Keys removed per `SCAN` round trip when invalidating a user
const SCAN_BATCH: usize = 100;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("L1 invalidation failed: {0}")]
    InvalidationError(#[from] moka::PredicateError),
}

/// Per-user invalidation stamps
///
/// A reader takes a stamp before loading a profile and only writes its
/// result back if the stamp is unchanged, so a ranking computed from a
/// profile that was edited mid-request never lands in the cache.
/// Stamps are process-local; other instances rely on the Redis TTL.
pub struct Generations {
    clock: AtomicU64,
    stamps: moka::future::Cache<String, u64>,
}

impl Generations {
    pub fn new(capacity: u64) -> Self {
        Self {
            clock: AtomicU64::new(0),
            stamps: moka::future::Cache::new(capacity),
        }
    }

    /// Current stamp of a user; 0 until the user is first invalidated
    pub async fn current(&self, user_id: &str) -> u64 {
        self.stamps.get(user_id).await.unwrap_or(0)
    }

    /// Move a user to a fresh stamp
    pub async fn bump(&self, user_id: &str) -> u64 {
        let next = self.clock.fetch_add(1, Ordering::Relaxed) + 1;
        self.stamps.insert(user_id.to_string(), next).await;
        next
    }

    pub async fn is_current(&self, user_id: &str, stamp: u64) -> bool {
        self.current(user_id).await == stamp
    }
}

/// Two-tier cache of ranked recommendations
///
/// L1 is an in-process moka cache holding serialized responses, L2 is Redis
/// and shared across instances. Both tiers expire entries after `ttl`.
pub struct CacheManager {
    redis: ConnectionManager,
    local: moka::future::Cache<String, Arc<str>>,
    generations: Generations,
    ttl: Duration,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let redis = ConnectionManager::new(redis::Client::open(redis_url)?).await?;
        let ttl = Duration::from_secs(ttl_secs);

        let local = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();

        Ok(Self {
            redis,
            local,
            generations: Generations::new(l1_size.saturating_mul(10).max(1024)),
            ttl,
        })
    }

    /// Look a key up in L1, then L2; a Redis hit is copied into L1
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        if let Some(json) = self.local.get(key).await {
            return Ok(Some(serde_json::from_str(&json)?));
        }

        let mut conn = self.redis.clone();
        let stored: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;

        match stored {
            Some(json) => {
                let value = serde_json::from_str(&json)?;
                self.local.insert(key.to_string(), Arc::from(json)).await;
                tracing::trace!("L2 cache hit: {}", key);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Stamp to pass to [`CacheManager::set_if_current`] for `user_id`
    pub async fn stamp(&self, user_id: &str) -> u64 {
        self.generations.current(user_id).await
    }

    /// Store `value` under `key` unless the user was invalidated after `stamp`
    ///
    /// Returns whether the value was written.
    pub async fn set_if_current<T: Serialize>(
        &self,
        key: &str,
        user_id: &str,
        stamp: u64,
        value: &T,
    ) -> Result<bool, CacheError> {
        if !self.generations.is_current(user_id, stamp).await {
            tracing::debug!("Not caching {}: profile changed while ranking", key);
            return Ok(false);
        }

        let json = serde_json::to_string(value)?;

        let mut conn = self.redis.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(&json)
            .arg("EX")
            .arg(self.ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await?;

        self.local.insert(key.to_string(), Arc::from(json)).await;
        Ok(true)
    }

    /// Drop every cached entry belonging to a user, in both tiers
    pub async fn invalidate_user(&self, user_id: &str) -> Result<(), CacheError> {
        self.generations.bump(user_id).await;

        let prefix = CacheKey::user_prefix(user_id);
        let local_prefix = prefix.clone();
        self.local
            .invalidate_entries_if(move |key, _| key.starts_with(&local_prefix))?;

        let pattern = format!("{}*", prefix);
        let mut conn = self.redis.clone();
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                removed += keys.len();
                let _: () = redis::cmd("DEL").arg(keys).query_async(&mut conn).await?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        tracing::debug!("Invalidated {} cached entries for {}", removed, user_id);
        Ok(())
    }

    /// Approximate number of entries held in L1
    pub fn l1_entries(&self) -> u64 {
        self.local.entry_count()
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key of one ranked response: `recs:{user}:{category|all}:{limit}`
    pub fn recommendations(user_id: &str, category: Option<&str>, limit: usize) -> String {
        format!("{}{}:{}", Self::user_prefix(user_id), category.unwrap_or("all"), limit)
    }

    /// Prefix shared by every key of a user
    pub fn user_prefix(user_id: &str) -> String {
        format!("recs:{}:", user_id)
    }
}
