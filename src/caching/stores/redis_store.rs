//! # Redis Store
//!
//! Redis-backed implementation of [`KeyValueStore`]. Owns the connection
//! lifecycle: [`RedisStore::connect`] establishes the connection once at
//! process start with bounded backoff, [`RedisStore::shutdown`] releases
//! it. When the connect retries are exhausted the store is constructed in a
//! persistent-unavailable state and every operation reports
//! [`CacheError::Unavailable`] instead of retrying forever; the layers
//! above degrade to their safe defaults.

use super::{KeyValueStore, StoreStats};
use crate::caching::{CacheError, CacheResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Redis store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis connection URL
    pub url: String,

    /// Key prefix applied to every entry
    pub key_prefix: String,

    /// Maximum number of connection attempts before giving up
    pub max_connect_retries: u32,

    /// Upper bound on the backoff delay between attempts
    #[serde(with = "humantime_serde")]
    pub max_retry_delay: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: "contentforge:".to_string(),
            max_connect_retries: 10,
            max_retry_delay: Duration::from_secs(3),
        }
    }
}

/// Redis-backed key-value store
pub struct RedisStore {
    /// Configuration
    config: RedisStoreConfig,

    /// Connection handle; `None` after a failed connect or shutdown
    connection: RwLock<Option<ConnectionManager>>,

    /// Live connection health flag
    available: AtomicBool,

    /// Backend errors observed since connect
    connection_errors: AtomicU64,
}

impl RedisStore {
    /// Establish the connection and build the store.
    ///
    /// Retries with backoff `min(attempt * 100ms, max_retry_delay)` up to
    /// `max_connect_retries` attempts. On exhaustion the store comes up
    /// unavailable rather than failing construction, so the process can
    /// still serve requests with the cache degraded.
    pub async fn connect(config: RedisStoreConfig) -> Self {
        let mut attempt: u32 = 0;

        let connection = loop {
            match Self::open(&config.url).await {
                Ok(manager) => {
                    info!(url = %config.url, "redis store connected");
                    break Some(manager);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= config.max_connect_retries {
                        error!(
                            url = %config.url,
                            attempts = attempt,
                            error = %e,
                            "redis connection retries exhausted, store is unavailable"
                        );
                        break None;
                    }

                    let delay = Duration::from_millis(u64::from(attempt) * 100)
                        .min(config.max_retry_delay);
                    warn!(
                        url = %config.url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "redis connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        };

        let available = connection.is_some();
        Self {
            config,
            connection: RwLock::new(connection),
            available: AtomicBool::new(available),
            connection_errors: AtomicU64::new(0),
        }
    }

    async fn open(url: &str) -> CacheResult<ConnectionManager> {
        let client = Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(manager)
    }

    /// Release the connection. Subsequent operations report unavailable
    /// until `connect` builds a new store.
    pub async fn shutdown(&self) {
        let mut guard = self.connection.write().await;
        if guard.take().is_some() {
            info!("redis store shut down");
        }
        self.available.store(false, Ordering::Relaxed);
    }

    /// Current connection health as observed by the latest operation
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Backend errors observed since connect
    pub fn connection_errors(&self) -> u64 {
        self.connection_errors.load(Ordering::Relaxed)
    }

    /// Get the full storage key with prefix
    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    /// Clone the connection handle out of the lock, or report unavailable.
    /// `ConnectionManager` multiplexes internally, so operations run on a
    /// clone without holding the lock across I/O.
    async fn handle(&self) -> CacheResult<ConnectionManager> {
        let guard = self.connection.read().await;
        guard.clone().ok_or(CacheError::Unavailable)
    }

    /// Record the outcome of a backend round trip on the health flag
    fn observe<T>(&self, result: Result<T, redis::RedisError>) -> CacheResult<T> {
        match result {
            Ok(value) => {
                self.available.store(true, Ordering::Relaxed);
                Ok(value)
            }
            Err(e) => {
                self.available.store(false, Ordering::Relaxed);
                self.connection_errors.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "redis operation failed");
                Err(CacheError::Redis(e))
            }
        }
    }

    /// Collect all keys under the configured prefix via SCAN
    async fn scan_keys(&self, conn: &mut ConnectionManager) -> Result<Vec<String>, redis::RedisError> {
        let pattern = format!("{}*", self.config.key_prefix);
        let mut cursor: u64 = 0;
        let mut all_keys = Vec::new();

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(1000)
                .query_async(conn)
                .await?;

            all_keys.extend(keys);

            if new_cursor == 0 {
                break;
            }
            cursor = new_cursor;
        }

        Ok(all_keys)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let full_key = self.full_key(key);
        let mut conn = self.handle().await?;

        let value = self
            .observe(conn.get::<_, Option<String>>(&full_key).await)?;
        debug!(key, hit = value.is_some(), "redis get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let full_key = self.full_key(key);
        let mut conn = self.handle().await?;

        self.observe(
            conn.set_ex::<_, _, ()>(&full_key, value, ttl.as_secs())
                .await,
        )?;
        debug!(key, ttl_secs = ttl.as_secs(), "redis set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let full_key = self.full_key(key);
        let mut conn = self.handle().await?;

        let deleted: i32 = self.observe(conn.del(&full_key).await)?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let full_key = self.full_key(key);
        let mut conn = self.handle().await?;

        let exists: bool = self.observe(conn.exists(&full_key).await)?;
        Ok(exists)
    }

    async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<u64> {
        let full_key = self.full_key(key);
        let mut conn = self.handle().await?;

        // Single round-trip INCR keeps concurrent increments lossless.
        let count: u64 = self.observe(conn.incr(&full_key, 1).await)?;
        if count == 1 {
            self.observe(
                conn.expire::<_, ()>(&full_key, ttl.as_secs() as i64)
                    .await,
            )?;
        }
        Ok(count)
    }

    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<Duration>> {
        let full_key = self.full_key(key);
        let mut conn = self.handle().await?;

        // PTTL: -2 means the key is absent, -1 means no expiry.
        let millis: i64 = self.observe(
            redis::cmd("PTTL")
                .arg(&full_key)
                .query_async(&mut conn)
                .await,
        )?;

        if millis < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_millis(millis as u64)))
        }
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut conn = self.handle().await?;

        let keys = self.observe(self.scan_keys(&mut conn).await)?;
        if !keys.is_empty() {
            let deleted: i32 = self.observe(conn.del(&keys).await)?;
            info!(deleted, "cleared redis namespace");
        }
        Ok(())
    }

    async fn stats(&self) -> CacheResult<StoreStats> {
        let mut conn = self.handle().await?;

        let info: String = self.observe(
            redis::cmd("INFO")
                .arg("memory")
                .query_async(&mut conn)
                .await,
        )?;

        let memory_usage = info
            .lines()
            .find(|line| line.starts_with("used_memory:"))
            .and_then(|line| line.split(':').nth(1))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let key_count = self.observe(self.scan_keys(&mut conn).await)?.len();

        Ok(StoreStats {
            key_count,
            memory_usage,
        })
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = match self.handle().await {
            Ok(conn) => conn,
            Err(_) => return Ok(false),
        };

        let pong = redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await;
        match self.observe(pong) {
            Ok(response) => Ok(response == "PONG"),
            Err(_) => Ok(false),
        }
    }
}
