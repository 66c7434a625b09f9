//! # Configuration
//!
//! Environment-driven configuration for the cache and rate-limit layer.
//! The embedding application loads this once at process start and wires
//! the resulting store handle into every component explicitly; nothing
//! here is read through global lookup after startup.

use crate::caching::stores::RedisStoreConfig;
use crate::traffic::OnBackendError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Top-level configuration for the layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backing store connection
    pub redis: RedisStoreConfig,

    /// Rate limiter behavior
    pub rate_limit: RateLimitSettings,

    /// Facade TTL for calls that pass no explicit lifetime
    #[serde(with = "humantime_serde")]
    pub default_cache_ttl: Duration,
}

/// Rate limiter settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Outcome applied when the backing store is unreachable.
    /// Defaults to `deny`; `allow` removes upstream protection during an
    /// outage and must be chosen deliberately.
    pub on_backend_error: OnBackendError,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis: RedisStoreConfig::default(),
            rate_limit: RateLimitSettings::default(),
            default_cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl Config {
    /// Build configuration from the environment.
    ///
    /// Recognized variables:
    /// - `REDIS_URL`: backing store endpoint, default
    ///   `redis://localhost:6379`
    /// - `CACHE_KEY_PREFIX`: namespace prefix, default `contentforge:`
    /// - `RATE_LIMIT_ON_BACKEND_ERROR`: `allow` or `deny`, default `deny`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("REDIS_URL") {
            config.redis.url = url;
        }
        if let Ok(prefix) = std::env::var("CACHE_KEY_PREFIX") {
            config.redis.key_prefix = prefix;
        }
        if let Ok(raw) = std::env::var("RATE_LIMIT_ON_BACKEND_ERROR") {
            config.rate_limit.on_backend_error = match raw.to_lowercase().as_str() {
                "allow" => OnBackendError::Allow,
                "deny" => OnBackendError::Deny,
                other => {
                    warn!(
                        value = other,
                        "unrecognized RATE_LIMIT_ON_BACKEND_ERROR, keeping deny"
                    );
                    OnBackendError::Deny
                }
            };
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.redis.key_prefix, "contentforge:");
        assert_eq!(config.redis.max_connect_retries, 10);
        assert_eq!(config.rate_limit.on_backend_error, OnBackendError::Deny);
        assert_eq!(config.default_cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.redis.url, config.redis.url);
        assert_eq!(
            parsed.rate_limit.on_backend_error,
            config.rate_limit.on_backend_error
        );
    }
}
