//! # Cache Facade
//!
//! Typed, fail-soft caching operations over a [`KeyValueStore`]. Values
//! are JSON-serialized, so any payload that round-trips through
//! `serde_json` (numbers, strings, nested maps, sequences) can be cached
//! without loss of structure.
//!
//! Every operation contains backend errors at this boundary: a failed
//! read is a miss, a failed write is silently lost, a failed existence
//! probe is `false`. Callers get slower on an outage, never broken.

use super::stores::{KeyValueStore, StoreStats};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Facade over the raw store with JSON serialization and error
/// containment
pub struct Cache {
    /// Backing store, shared with the rate limiter
    store: Arc<dyn KeyValueStore>,

    /// TTL used when a call site does not pass one
    default_ttl: Duration,

    /// Process-local hit/miss counters
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Aggregated cache statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CacheStats {
    /// Keys currently in the namespace (0 when the backend is down)
    pub key_count: usize,

    /// Backend memory usage in bytes (0 when unknown)
    pub memory_usage: usize,

    /// Hits observed by this process
    pub hits: u64,

    /// Misses observed by this process, including degraded reads
    pub misses: u64,
}

impl Cache {
    /// Create a facade over `store`. `default_ttl` applies to `set`
    /// calls that pass no explicit lifetime.
    pub fn new(store: Arc<dyn KeyValueStore>, default_ttl: Duration) -> Self {
        Self {
            store,
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Serialize and store a value. `ttl` falls back to the facade
    /// default; categories pass their registry TTL here. A backend
    /// error drops the write.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "cache set skipped, value not serializable");
                return;
            }
        };

        let ttl = ttl.unwrap_or(self.default_ttl);
        if let Err(e) = self.store.set(key, &raw, ttl).await {
            warn!(key, error = %e, "cache write lost");
        }
    }

    /// Fetch and deserialize a value. A backend error or a malformed
    /// stored value is reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Some(value)
                }
                Err(e) => {
                    warn!(key, error = %e, "cached value malformed, treating as miss");
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    None
                }
            },
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Best-effort delete
    pub async fn delete(&self, key: &str) {
        match self.store.delete(key).await {
            Ok(deleted) => debug!(key, deleted, "cache delete"),
            Err(e) => warn!(key, error = %e, "cache delete failed"),
        }
    }

    /// Whether a key exists; a backend error yields `false`
    pub async fn exists(&self, key: &str) -> bool {
        match self.store.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(key, error = %e, "cache exists probe failed");
                false
            }
        }
    }

    /// Flush the whole namespace. Maintenance only, never per-request.
    pub async fn clear(&self) {
        match self.store.clear().await {
            Ok(()) => debug!("cache cleared"),
            Err(e) => warn!(error = %e, "cache clear failed"),
        }
    }

    /// Best-effort statistics; zeroed store fields when the backend is
    /// unreachable
    pub async fn stats(&self) -> CacheStats {
        let store_stats = match self.store.stats().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "cache stats unavailable");
                StoreStats::default()
            }
        };

        CacheStats {
            key_count: store_stats.key_count,
            memory_usage: store_stats.memory_usage,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
