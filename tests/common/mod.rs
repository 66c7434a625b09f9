//! Shared test fixtures.

use async_trait::async_trait;
use contentforge_cache::{CacheError, CacheResult, KeyValueStore, StoreStats};
use std::time::Duration;

/// Store double whose every operation reports an unreachable backend.
/// Used to verify fail-soft and fail-open/fail-closed behavior.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Unavailable)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Unavailable)
    }

    async fn delete(&self, _key: &str) -> CacheResult<bool> {
        Err(CacheError::Unavailable)
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        Err(CacheError::Unavailable)
    }

    async fn incr(&self, _key: &str, _ttl: Duration) -> CacheResult<u64> {
        Err(CacheError::Unavailable)
    }

    async fn ttl_remaining(&self, _key: &str) -> CacheResult<Option<Duration>> {
        Err(CacheError::Unavailable)
    }

    async fn clear(&self) -> CacheResult<()> {
        Err(CacheError::Unavailable)
    }

    async fn stats(&self) -> CacheResult<StoreStats> {
        Err(CacheError::Unavailable)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(false)
    }
}
