//! # Rate Limiting System
//!
//! Fixed-window request counting keyed by (client identity, policy),
//! backed by the shared store so every worker process observes one
//! consistent count and counters survive restarts within their window.
//!
//! ## Algorithm
//! One counter key per (identity, policy) with the policy window as its
//! TTL. A request reads the counter, refuses once the limit is reached,
//! and otherwise increments with a single atomic store round trip.
//! Window rollover is the key's expiry: when the TTL elapses the next
//! increment creates a fresh window, so two concurrent requests that
//! both observe an expired window converge on the same fresh counter.
//!
//! ## Backend outages
//! Store failures never surface as errors to request handlers. The
//! [`OnBackendError`] setting names the outcome explicitly and applies
//! it at every call site: `Deny` (the default) sheds load to protect
//! the upstream, `Allow` keeps serving and must be opted into.

use crate::caching::{keys, CacheError, CacheResult, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by limiter maintenance operations
#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("storage error: {0}")]
    Store(#[from] CacheError),
}

/// A named, process-wide rate-limit policy. Policies are static
/// configuration and are not mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitPolicy {
    /// Policy name, also the endpoint dimension of the counter key
    pub name: &'static str,

    /// Window length
    pub window: Duration,

    /// Maximum requests admitted per window
    pub max_requests: u32,
}

impl RateLimitPolicy {
    /// Limits calls into the AI completion API
    pub const AI_RESOURCE: Self = Self {
        name: "ai-resource",
        window: Duration::from_millis(60_000),
        max_requests: 20,
    };

    /// Limits state-changing actions per user
    pub const USER_ACTION: Self = Self {
        name: "user-action",
        window: Duration::from_millis(60_000),
        max_requests: 50,
    };

    /// General ceiling across the public API
    pub const GENERAL_API: Self = Self {
        name: "general-api",
        window: Duration::from_millis(60_000),
        max_requests: 200,
    };

    /// The three policies enforced by the engine
    pub fn all() -> [Self; 3] {
        [Self::AI_RESOURCE, Self::USER_ACTION, Self::GENERAL_API]
    }
}

/// Behavior when the backing store cannot be reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnBackendError {
    /// Admit every request while the store is down. Opt-in only: an
    /// outage then removes all protection from the upstream.
    Allow,

    /// Refuse every request while the store is down (default)
    #[default]
    Deny,
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,

    /// Requests left in the current window after this decision
    pub remaining: u32,

    /// When the current window rolls over
    pub reset_at: DateTime<Utc>,

    /// Suggested wait before retrying, set on denials
    pub retry_after: Option<Duration>,
}

/// Read-only view of one (identity, policy) counter
#[derive(Debug, Clone, Serialize)]
pub struct PolicyStatus {
    /// Policy name
    pub policy: &'static str,

    /// Requests observed in the current window
    pub count: u64,

    /// Requests left in the current window
    pub remaining: u32,

    /// Window ceiling
    pub limit: u32,

    /// When the current window rolls over
    pub reset_at: DateTime<Utc>,

    /// Window length in milliseconds
    pub window_ms: u64,
}

/// Snapshot of limiter decision counters
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitMetricsSnapshot {
    pub requests_allowed: u64,
    pub requests_denied: u64,
}

/// Fixed-window rate limiter over the shared store
pub struct FixedWindowLimiter {
    /// Backing store, shared with the cache facade
    store: Arc<dyn KeyValueStore>,

    /// Outage behavior, applied uniformly
    on_backend_error: OnBackendError,

    /// Decision counters for observability
    requests_allowed: AtomicU64,
    requests_denied: AtomicU64,
}

impl FixedWindowLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, on_backend_error: OnBackendError) -> Self {
        Self {
            store,
            on_backend_error,
            requests_allowed: AtomicU64::new(0),
            requests_denied: AtomicU64::new(0),
        }
    }

    /// Check the counter for (identity, policy) and admit or refuse the
    /// request.
    ///
    /// Admission increments the counter atomically; refusals leave it
    /// untouched. A request racing past the ceiling between the read and
    /// its own increment is refused, so the count overshoots the limit
    /// only transiently and decays with the window.
    pub async fn check_and_increment(
        &self,
        identity: &str,
        policy: &RateLimitPolicy,
    ) -> RateLimitDecision {
        match self.try_check(identity, policy).await {
            Ok(decision) => {
                if decision.allowed {
                    self.requests_allowed.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.requests_denied.fetch_add(1, Ordering::Relaxed);
                    debug!(identity, policy = policy.name, "rate limit exceeded");
                }
                decision
            }
            Err(e) => {
                warn!(
                    identity,
                    policy = policy.name,
                    error = %e,
                    outcome = ?self.on_backend_error,
                    "rate limit backend unavailable"
                );
                self.degraded_decision(policy)
            }
        }
    }

    async fn try_check(
        &self,
        identity: &str,
        policy: &RateLimitPolicy,
    ) -> CacheResult<RateLimitDecision> {
        let key = keys::rate_limit(identity, policy.name);
        let limit = u64::from(policy.max_requests);

        let current = match self.store.get(&key).await? {
            Some(raw) => raw.parse::<u64>().unwrap_or(0),
            None => 0,
        };

        if current >= limit {
            let window_left = self.window_left(&key, policy).await?;
            return Ok(self.denied(window_left));
        }

        let count = self.store.incr(&key, policy.window).await?;
        let window_left = self.window_left(&key, policy).await?;

        if count > limit {
            // Lost the race for the last slot in this window.
            return Ok(self.denied(window_left));
        }

        Ok(RateLimitDecision {
            allowed: true,
            remaining: policy.max_requests - count as u32,
            reset_at: reset_timestamp(window_left),
            retry_after: None,
        })
    }

    /// Read-only counter view for the status surface; never mutates the
    /// count. A backend error reports a fresh, empty window.
    pub async fn status(&self, identity: &str, policy: &RateLimitPolicy) -> PolicyStatus {
        let key = keys::rate_limit(identity, policy.name);

        let (count, window_left) = match self.read_counter(&key, policy).await {
            Ok(state) => state,
            Err(e) => {
                warn!(identity, policy = policy.name, error = %e, "rate limit status degraded");
                (0, policy.window)
            }
        };

        PolicyStatus {
            policy: policy.name,
            count,
            remaining: policy.max_requests.saturating_sub(count as u32),
            limit: policy.max_requests,
            reset_at: reset_timestamp(window_left),
            window_ms: policy.window.as_millis() as u64,
        }
    }

    /// Drop the counter for (identity, policy). Maintenance operation;
    /// the next request starts a fresh window.
    pub async fn reset(&self, identity: &str, policy: &RateLimitPolicy) -> Result<(), RateLimitError> {
        let key = keys::rate_limit(identity, policy.name);
        self.store.delete(&key).await?;
        debug!(identity, policy = policy.name, "rate limit counter reset");
        Ok(())
    }

    /// Decision counters accumulated by this process
    pub fn metrics(&self) -> RateLimitMetricsSnapshot {
        RateLimitMetricsSnapshot {
            requests_allowed: self.requests_allowed.load(Ordering::Relaxed),
            requests_denied: self.requests_denied.load(Ordering::Relaxed),
        }
    }

    async fn read_counter(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
    ) -> CacheResult<(u64, Duration)> {
        let count = match self.store.get(key).await? {
            Some(raw) => raw.parse::<u64>().unwrap_or(0),
            None => 0,
        };
        let window_left = self.window_left(key, policy).await?;
        Ok((count, window_left))
    }

    /// Time until the current window rolls over; a missing TTL means the
    /// window has not started, which reads as a full window ahead.
    async fn window_left(&self, key: &str, policy: &RateLimitPolicy) -> CacheResult<Duration> {
        Ok(self
            .store
            .ttl_remaining(key)
            .await?
            .unwrap_or(policy.window))
    }

    fn denied(&self, window_left: Duration) -> RateLimitDecision {
        RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_at: reset_timestamp(window_left),
            retry_after: Some(window_left),
        }
    }

    fn degraded_decision(&self, policy: &RateLimitPolicy) -> RateLimitDecision {
        match self.on_backend_error {
            OnBackendError::Allow => RateLimitDecision {
                allowed: true,
                remaining: policy.max_requests,
                reset_at: reset_timestamp(policy.window),
                retry_after: None,
            },
            OnBackendError::Deny => RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: reset_timestamp(policy.window),
                retry_after: Some(policy.window),
            },
        }
    }
}

fn reset_timestamp(window_left: Duration) -> DateTime<Utc> {
    let left = chrono::Duration::from_std(window_left).unwrap_or_else(|_| chrono::Duration::zero());
    Utc::now() + left
}
