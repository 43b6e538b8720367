use netowork_auth::cache::CacheService;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct CachedSession {
    id: i32,
    note: String,
}

#[tokio::test]
async fn test_in_memory_cache_basic_operations() {
    let cache = CacheService::in_memory();

    assert!(cache.get("missing").await.unwrap().is_none());

    cache
        .set("key", "value", None)
        .await
        .expect("Failed to set");
    assert_eq!(cache.get("key").await.unwrap(), Some("value".to_string()));

    assert!(cache.del("key").await.unwrap());
    assert!(cache.get("key").await.unwrap().is_none());
    assert!(!cache.del("key").await.unwrap(), "second delete finds nothing");
}

#[tokio::test]
async fn test_cache_json_operations() {
    let cache = CacheService::in_memory();
    let value = CachedSession {
        id: 3,
        note: "hello".to_string(),
    };

    cache
        .set_json("session:3", &value, None)
        .await
        .expect("Failed to set JSON");

    let retrieved: Option<CachedSession> = cache.get_json("session:3").await.unwrap();
    assert_eq!(retrieved, Some(value));
}

#[tokio::test]
async fn test_cache_entries_expire() {
    let cache = CacheService::in_memory();

    cache
        .set("short", "lived", Some(Duration::from_millis(50)))
        .await
        .expect("Failed to set");
    assert_eq!(cache.get("short").await.unwrap(), Some("lived".to_string()));

    tokio::time::sleep(Duration::from_millis(120)).await;

    assert!(cache.get("short").await.unwrap().is_none());
    assert!(!cache.del("short").await.unwrap(), "expired key counts as absent");
}

#[tokio::test]
async fn test_get_json_with_garbage_is_an_error() {
    let cache = CacheService::in_memory();
    cache.set("bad", "not json", None).await.unwrap();

    let result: Result<Option<CachedSession>, _> = cache.get_json("bad").await;
    assert!(result.is_err(), "garbage must not be reported as a miss");
}

#[tokio::test]
async fn test_from_url_without_redis_is_in_memory() {
    let cache = CacheService::from_url(None)
        .await
        .expect("in-memory cache needs no connection");
    cache.set("k", "v", None).await.unwrap();
    assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
}
