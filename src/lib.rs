//! # ContentForge Cache: Caching & Rate Limiting Layer
//!
//! Redis-backed caching and fixed-window rate limiting for the
//! ContentForge SEO content engine. The engine's route handlers sit in
//! front of one scarce, costly upstream (the AI completion API) plus a
//! relational store; this crate is the layer that keeps identical work
//! from being recomputed and concurrent clients from overrunning the
//! upstream.
//!
//! ## Architecture
//! - [`caching`]: raw store adapters (Redis, in-memory), the fail-soft
//!   typed cache facade, and the key/TTL registry
//! - [`traffic`]: the fixed-window rate limiter and the status reporter
//!   consumed by the dashboard
//! - [`core`]: environment-driven configuration
//! - [`observability`]: logging bootstrap for the embedding application
//!
//! ## Usage Example
//! ```no_run
//! use contentforge_cache::{Cache, Config, FixedWindowLimiter, RateLimitPolicy, RedisStore};
//! use contentforge_cache::caching::keys;
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let config = Config::from_env();
//! let store = Arc::new(RedisStore::connect(config.redis.clone()).await);
//!
//! let cache = Cache::new(store.clone(), config.default_cache_ttl);
//! let limiter = FixedWindowLimiter::new(store, config.rate_limit.on_backend_error);
//!
//! // Gate a request against the AI policy, then consult the cache.
//! let decision = limiter
//!     .check_and_increment("203.0.113.5", &RateLimitPolicy::AI_RESOURCE)
//!     .await;
//! if decision.allowed {
//!     let key = keys::content_generation(&["ring", "size", "guide"]);
//!     if cache.get::<String>(&key).await.is_none() {
//!         // ...call the completion API, then:
//!         // cache.set(&key, &generated, Some(CacheCategory::ContentGeneration.ttl())).await;
//!     }
//! }
//! # }
//! ```
//!
//! The store is the single source of truth for counters and entries;
//! every component receives its handle by injection and degrades to a
//! safe default when the backend is unreachable.

/// Caching: store adapters, fail-soft facade, key/TTL registry
pub mod caching;

/// Process-wide configuration
pub mod core;

/// Logging bootstrap
pub mod observability;

/// Rate limiting and status reporting
pub mod traffic;

pub use caching::{
    Cache, CacheCategory, CacheError, CacheResult, CacheStats, InMemoryStore, KeyValueStore,
    RedisStore, RedisStoreConfig, StoreStats,
};
pub use crate::core::config::{Config, RateLimitSettings};
pub use traffic::{
    FixedWindowLimiter, OnBackendError, PolicyStatus, RateLimitDecision, RateLimitError,
    RateLimitPolicy, RateLimitStatusReport, StatusReporter,
};
