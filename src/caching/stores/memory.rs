//! # In-Memory Store
//!
//! `DashMap`-backed implementation of [`KeyValueStore`] for tests and
//! local development without a Redis server. Expiry is computed lazily
//! against `tokio::time::Instant`, so tests driving a paused tokio clock
//! observe the same TTL semantics as the Redis backend.

use super::{KeyValueStore, StoreStats};
use crate::caching::CacheResult;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, Entry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired(now) {
                drop(entry);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<u64> {
        let now = Instant::now();
        // The entry API holds the shard lock for the whole read-modify-
        // write, which keeps concurrent increments lossless.
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry {
                value: "0".to_string(),
                expires_at: now + ttl,
            });

        if entry.is_expired(now) {
            entry.value = "0".to_string();
            entry.expires_at = now + ttl;
        }

        let count = entry.value.parse::<u64>().unwrap_or(0) + 1;
        entry.value = count.to_string();
        Ok(count)
    }

    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<Duration>> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                Ok(Some(entry.expires_at.saturating_duration_since(now)))
            }
            _ => Ok(None),
        }
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.clear();
        Ok(())
    }

    async fn stats(&self) -> CacheResult<StoreStats> {
        let now = Instant::now();
        let mut key_count = 0;
        let mut memory_usage = 0;

        for entry in self.entries.iter() {
            if !entry.value().is_expired(now) {
                key_count += 1;
                memory_usage += entry.key().len() + entry.value().value.len();
            }
        }

        Ok(StoreStats {
            key_count,
            memory_usage,
        })
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let store = InMemoryStore::new();
        store
            .set("key", "value", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some("value".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = InMemoryStore::new();
        store
            .set("key", "value", Duration::from_secs(30))
            .await
            .unwrap();

        advance(Duration::from_secs(29)).await;
        assert!(store.exists("key").await.unwrap());

        advance(Duration::from_secs(2)).await;
        assert_eq!(store.get("key").await.unwrap(), None);
        assert!(!store.exists("key").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_incr_resets_after_expiry() {
        let store = InMemoryStore::new();
        let ttl = Duration::from_secs(60);

        assert_eq!(store.incr("counter", ttl).await.unwrap(), 1);
        assert_eq!(store.incr("counter", ttl).await.unwrap(), 2);

        advance(Duration::from_secs(61)).await;
        assert_eq!(store.incr("counter", ttl).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = InMemoryStore::new();
        store.set("a", "1", Duration::from_secs(60)).await.unwrap();
        store.set("b", "2", Duration::from_secs(60)).await.unwrap();

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert_eq!(store.get("a").await.unwrap(), None);

        store.clear().await.unwrap();
        assert_eq!(store.stats().await.unwrap().key_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining() {
        let store = InMemoryStore::new();
        store
            .set("key", "value", Duration::from_secs(100))
            .await
            .unwrap();

        advance(Duration::from_secs(40)).await;
        let remaining = store.ttl_remaining("key").await.unwrap().unwrap();
        assert_eq!(remaining, Duration::from_secs(60));

        assert_eq!(store.ttl_remaining("missing").await.unwrap(), None);
    }
}
