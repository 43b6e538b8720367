use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Cache backend trait for pluggable key-value stores with expiry.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a raw value from the cache.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Set a raw value in the cache with optional TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Delete a key from the cache. Returns whether the key was present.
    async fn del(&self, key: &str) -> Result<bool, CacheError>;
}

/// The cache handle shared by the session store.
///
/// ```rust,ignore
/// let cache = CacheService::in_memory();
/// cache.set_json("session:abc", &record, Some(Duration::from_secs(60))).await?;
/// let record: Option<SessionRecord> = cache.get_json("session:abc").await?;
/// ```
#[derive(Clone)]
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
}

impl CacheService {
    /// Create a new cache service with the given backend.
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        CacheService {
            backend: Arc::new(backend),
        }
    }

    /// Create an in-memory cache (good for development and testing).
    pub fn in_memory() -> Self {
        CacheService::new(InMemoryCache::new())
    }

    /// Connect to Redis, or fall back to an in-memory cache when no URL is given.
    pub async fn from_url(url: Option<&str>) -> Result<Self, CacheError> {
        match url {
            #[cfg(feature = "redis")]
            Some(url) => Ok(CacheService::new(RedisCache::new(url).await?)),
            #[cfg(not(feature = "redis"))]
            Some(_) => Err(CacheError::Backend(
                "REDIS_URL is set but the redis feature is disabled".to_string(),
            )),
            None => {
                tracing::info!("No REDIS_URL configured, using in-memory session cache");
                Ok(CacheService::in_memory())
            }
        }
    }

    /// Get a JSON-deserialized value from the cache.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Set a JSON-serialized value in the cache.
    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw, ttl).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.backend.get(key).await
    }

    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.backend.set(key, value, ttl).await
    }

    pub async fn del(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.del(key).await
    }
}

// ── In-Memory Cache Backend ──

/// In-memory cache using a HashMap. Expired entries are dropped lazily on read.
#[derive(Clone, Default)]
pub struct InMemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Evict `key` only if the entry now stored there is expired. Another task
/// may have replaced it since the caller saw the expired value.
fn remove_if_expired(store: &mut HashMap<String, CacheEntry>, key: &str) {
    if store.get(key).is_some_and(CacheEntry::is_expired) {
        store.remove(key);
    }
}

#[async_trait::async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let store = self.store.read().await;
        match store.get(key) {
            Some(entry) if entry.is_expired() => {
                drop(store);
                remove_if_expired(&mut *self.store.write().await, key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        // Durations too large for Instant never expire.
        let expires_at = ttl.and_then(|d| Instant::now().checked_add(d));
        self.store.write().await.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, CacheError> {
        match self.store.write().await.remove(key) {
            Some(entry) => Ok(!entry.is_expired()),
            None => Ok(false),
        }
    }
}

// ── Redis Cache Backend ──

/// Redis-backed cache for production use.
///
/// ```rust,ignore
/// let cache = RedisCache::new("redis://127.0.0.1:6379").await?;
/// let service = CacheService::new(cache);
/// ```
#[cfg(feature = "redis")]
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

#[cfg(feature = "redis")]
impl RedisCache {
    /// Connect to Redis. Fails if the server cannot be reached.
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Backend(format!("Redis connection error: {}", e)))?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis connection error: {}", e)))?;
        tracing::info!("Connected to Redis session cache");
        Ok(RedisCache { conn })
    }
}

#[cfg(feature = "redis")]
#[async_trait::async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis GET error: {}", e)))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        match ttl {
            // SETEX rejects a zero expiry.
            Some(ttl) => conn
                .set_ex(key, value, ttl.as_secs().max(1))
                .await
                .map_err(|e| CacheError::Backend(format!("Redis SETEX error: {}", e))),
            None => conn
                .set(key, value)
                .await
                .map_err(|e| CacheError::Backend(format!("Redis SET error: {}", e))),
        }
    }

    async fn del(&self, key: &str) -> Result<bool, CacheError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        let count: i64 = conn
            .del(key)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis DEL error: {}", e)))?;
        Ok(count > 0)
    }
}
