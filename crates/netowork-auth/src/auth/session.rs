use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::token::{expiry_from_now, generate_session_key};
use crate::cache::{CacheError, CacheService};

/// Extra cache lifetime past the logical expiry, so an expired session can
/// still be found and refreshed instead of vanishing.
pub const SESSION_GRACE: Duration = Duration::from_secs(24 * 60 * 60);

const KEY_PREFIX: &str = "session:";

/// Cached value behind a session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Owning user id
    pub id: i32,
    pub expires: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires
    }
}

/// Session records in the cache, keyed by an unguessable session key.
#[derive(Clone)]
pub struct SessionStore {
    cache: CacheService,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(cache: CacheService, ttl: Duration) -> Self {
        SessionStore { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn cache_key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    /// Start a session for `user_id` and return its key.
    pub async fn create(&self, user_id: i32) -> Result<String, CacheError> {
        let key = generate_session_key();
        let record = SessionRecord {
            id: user_id,
            expires: expiry_from_now(self.ttl),
        };
        let cache_ttl = self.ttl.saturating_add(SESSION_GRACE);

        self.cache
            .set_json(&Self::cache_key(&key), &record, Some(cache_ttl))
            .await?;
        Ok(key)
    }

    /// `Ok(None)` when no record is cached under `key`.
    pub async fn load(&self, key: &str) -> Result<Option<SessionRecord>, CacheError> {
        self.cache.get_json(&Self::cache_key(key)).await
    }

    /// Returns whether a record was removed.
    pub async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        self.cache.del(&Self::cache_key(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_shape() {
        let record = SessionRecord {
            id: 42,
            expires: DateTime::parse_from_rfc3339("2025-04-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["expires"], "2025-04-01T10:00:00Z");
    }

    #[tokio::test]
    async fn test_create_load_remove() {
        let store = SessionStore::new(CacheService::in_memory(), Duration::from_secs(60));
        let key = store.create(5).await.unwrap();

        let record = store.load(&key).await.unwrap().expect("session should be cached");
        assert_eq!(record.id, 5);
        assert!(!record.is_expired());

        assert!(store.remove(&key).await.unwrap());
        assert!(store.load(&key).await.unwrap().is_none());
        assert!(!store.remove(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_expired_but_cached() {
        let store = SessionStore::new(CacheService::in_memory(), Duration::ZERO);
        let key = store.create(1).await.unwrap();

        let record = store.load(&key).await.unwrap().expect("grace window keeps it");
        assert!(record.is_expired());
    }
}
