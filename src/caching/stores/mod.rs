//! # Cache Stores Module
//!
//! Raw key-value backends shared by the cache facade and the rate
//! limiter. Values are stored as strings (the facade handles JSON
//! serialization); TTLs are enforced by the backend so that an expired
//! entry is indistinguishable from one that was never written.

pub mod memory;
pub mod redis_store;

pub use memory::InMemoryStore;
pub use redis_store::{RedisStore, RedisStoreConfig};

use super::CacheResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trait for raw key-value store implementations.
///
/// The store is the single source of truth for cache entries and
/// rate-limit counters; no component keeps authoritative state in
/// process-local memory. `incr` must be atomic at the store level so
/// that concurrent increments of the same key never lose updates.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the raw value for a key, `None` if absent or expired
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value with a TTL, overwriting any previous value
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Check whether a key exists and has not expired
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Atomically increment a counter key by one, returning the new
    /// value. When the increment creates the key, `ttl` is applied so
    /// the counter expires with its window.
    async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<u64>;

    /// Remaining lifetime of a key, `None` if absent or persistent
    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<Duration>>;

    /// Remove every entry in this store's namespace
    async fn clear(&self) -> CacheResult<()>;

    /// Best-effort introspection of the store
    async fn stats(&self) -> CacheResult<StoreStats>;

    /// Probe backend connectivity
    async fn health_check(&self) -> CacheResult<bool>;
}

/// Store-level statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of keys in the namespace
    pub key_count: usize,

    /// Backend memory usage in bytes, 0 when unknown
    pub memory_usage: usize,
}
