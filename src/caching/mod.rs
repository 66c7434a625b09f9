//! # Caching System Module
//!
//! Redis-backed caching layer for the ContentForge engine. Expensive
//! upstream work (AI content generation, page queries, analytics rollups)
//! is cached under deterministic keys with fixed per-category TTLs.
//!
//! ## Architecture
//! The layer is split into three pieces:
//! 1. **Stores**: raw key-value backends (Redis for production, in-memory
//!    for tests and local development) behind the [`KeyValueStore`] trait
//! 2. **Cache Facade**: typed, fail-soft get/set/delete operations with
//!    JSON serialization
//! 3. **Key Registry**: pure key builders and TTLs per cache category
//!
//! ## Failure model
//! The cache is a pure optimization. Every facade operation degrades to a
//! safe default when the backend is unreachable (a miss, a dropped write,
//! `false`, zeroed stats) and logs the fault. No caller may depend on a
//! cache hit for correctness, and no backend error crosses this module's
//! boundary as a panic or a hard failure.

pub mod cache;
pub mod keys;
pub mod stores;

pub use cache::{Cache, CacheStats};
pub use keys::CacheCategory;
pub use stores::{InMemoryStore, KeyValueStore, RedisStore, RedisStoreConfig, StoreStats};

/// Cache operation result
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-specific error types
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache store error: {message}")]
    Store { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache backend not available")]
    Unavailable,
}
