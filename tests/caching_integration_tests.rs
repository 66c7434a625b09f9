//! # Caching Integration Tests
//!
//! Exercises the cache facade through its public surface against the
//! in-memory store, including TTL expiry under the paused tokio clock
//! and fail-soft behavior against an unreachable backend.

mod common;

use common::FailingStore;
use contentforge_cache::caching::keys;
use contentforge_cache::{Cache, CacheCategory, InMemoryStore, KeyValueStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::advance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GeneratedPage {
    title: String,
    word_count: u64,
    sections: Vec<String>,
    meta: BTreeMap<String, String>,
}

fn sample_page() -> GeneratedPage {
    GeneratedPage {
        title: "Ring Size Guide".to_string(),
        word_count: 1240,
        sections: vec!["intro".to_string(), "sizing-chart".to_string()],
        meta: BTreeMap::from([
            ("description".to_string(), "How to measure ring size".to_string()),
            ("robots".to_string(), "index,follow".to_string()),
        ]),
    }
}

fn cache_over(store: Arc<dyn KeyValueStore>) -> Cache {
    Cache::new(store, Duration::from_secs(3600))
}

#[tokio::test]
async fn set_then_get_round_trips_nested_structure() {
    let cache = cache_over(Arc::new(InMemoryStore::new()));
    let key = keys::content_generation(&["ring", "size", "guide"]);
    let page = sample_page();

    cache
        .set(&key, &page, Some(CacheCategory::ContentGeneration.ttl()))
        .await;

    let cached: Option<GeneratedPage> = cache.get(&key).await;
    assert_eq!(cached, Some(page));
}

#[tokio::test(start_paused = true)]
async fn entries_expire_after_their_category_ttl() {
    let cache = cache_over(Arc::new(InMemoryStore::new()));
    let key = keys::page_data("ring-size-guide");

    cache
        .set(&key, &sample_page(), Some(CacheCategory::PageData.ttl()))
        .await;
    assert!(cache.exists(&key).await);

    // PageData TTL is 1800s; one second past it the entry is gone.
    advance(Duration::from_secs(1801)).await;

    let cached: Option<GeneratedPage> = cache.get(&key).await;
    assert_eq!(cached, None);
    assert!(!cache.exists(&key).await);
}

#[tokio::test]
async fn delete_makes_an_entry_absent() {
    let cache = cache_over(Arc::new(InMemoryStore::new()));
    let key = keys::meta_generation("ring size");

    cache.set(&key, &"Ring sizes explained", None).await;
    assert!(cache.exists(&key).await);

    cache.delete(&key).await;
    assert!(!cache.exists(&key).await);
    assert_eq!(cache.get::<String>(&key).await, None);

    // Deleting an absent key is a no-op, not a fault.
    cache.delete(&key).await;
}

#[tokio::test]
async fn overwrite_replaces_the_previous_value() {
    let cache = cache_over(Arc::new(InMemoryStore::new()));
    let key = keys::page_list("published");

    cache.set(&key, &vec!["a", "b"], None).await;
    cache.set(&key, &vec!["c"], None).await;

    assert_eq!(
        cache.get::<Vec<String>>(&key).await,
        Some(vec!["c".to_string()])
    );
}

#[tokio::test]
async fn malformed_stored_value_reads_as_a_miss() {
    let store = Arc::new(InMemoryStore::new());
    let cache = cache_over(store.clone());
    let key = keys::page_data("corrupted");

    // Simulate a writer that stored something the facade cannot parse.
    store
        .set(&key, "not-json{", Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(cache.get::<GeneratedPage>(&key).await, None);
}

#[tokio::test]
async fn clear_empties_the_namespace() {
    let cache = cache_over(Arc::new(InMemoryStore::new()));

    cache.set(&keys::page_data("a"), &1u32, None).await;
    cache.set(&keys::page_data("b"), &2u32, None).await;

    cache.clear().await;

    assert_eq!(cache.get::<u32>(&keys::page_data("a")).await, None);
    assert_eq!(cache.get::<u32>(&keys::page_data("b")).await, None);
    assert_eq!(cache.stats().await.key_count, 0);
}

#[tokio::test]
async fn stats_track_hits_and_misses() {
    let cache = cache_over(Arc::new(InMemoryStore::new()));
    let key = keys::analytics("pageviews", "2024-06-01");

    cache.set(&key, &42u64, None).await;
    let _: Option<u64> = cache.get(&key).await; // hit
    let _: Option<u64> = cache.get("absent").await; // miss

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.key_count, 1);
    assert!(stats.memory_usage > 0);
}

#[tokio::test]
async fn every_operation_degrades_when_the_backend_is_down() {
    let cache = cache_over(Arc::new(FailingStore));
    let key = keys::content_generation(&["ring"]);

    // Writes are lost without raising.
    cache.set(&key, &sample_page(), None).await;

    // Reads are misses, probes are false, stats are zeroed.
    assert_eq!(cache.get::<GeneratedPage>(&key).await, None);
    assert!(!cache.exists(&key).await);

    cache.delete(&key).await;
    cache.clear().await;

    let stats = cache.stats().await;
    assert_eq!(stats.key_count, 0);
    assert_eq!(stats.memory_usage, 0);
}

#[tokio::test]
async fn limiter_and_cache_share_one_store() {
    use contentforge_cache::{FixedWindowLimiter, OnBackendError, RateLimitPolicy};

    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let cache = cache_over(store.clone());
    let limiter = FixedWindowLimiter::new(store, OnBackendError::Deny);

    // The request path: admission first, then the cache consult.
    let decision = limiter
        .check_and_increment("203.0.113.5", &RateLimitPolicy::AI_RESOURCE)
        .await;
    assert!(decision.allowed);

    let key = keys::content_generation(&["ring", "size", "guide"]);
    if cache.get::<GeneratedPage>(&key).await.is_none() {
        cache
            .set(&key, &sample_page(), Some(CacheCategory::ContentGeneration.ttl()))
            .await;
    }

    // A second identical request is admitted and served from cache.
    let second = limiter
        .check_and_increment("203.0.113.5", &RateLimitPolicy::AI_RESOURCE)
        .await;
    assert!(second.allowed);
    assert_eq!(second.remaining, 18);
    assert_eq!(cache.get::<GeneratedPage>(&key).await, Some(sample_page()));
}
