//! # Rate Limit Status Reporter
//!
//! Read-only aggregation of the three policy counters for the status
//! dashboard. Purely derived: recomputed from live counters on every
//! call, never cached, never mutating.

use super::rate_limiting::{FixedWindowLimiter, PolicyStatus, RateLimitPolicy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// One payload per client identity covering all enforced policies
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatusReport {
    /// Identity the counters are tracked against
    pub identity: String,

    /// When this report was computed
    pub generated_at: DateTime<Utc>,

    /// AI completion API limiter
    pub ai_resource: PolicyStatus,

    /// Per-user action limiter
    pub user_action: PolicyStatus,

    /// General API limiter
    pub general_api: PolicyStatus,
}

/// Aggregates live counter state for display
pub struct StatusReporter {
    limiter: Arc<FixedWindowLimiter>,
}

impl StatusReporter {
    pub fn new(limiter: Arc<FixedWindowLimiter>) -> Self {
        Self { limiter }
    }

    /// Build the status payload for `identity` from live counters
    pub async fn report(&self, identity: &str) -> RateLimitStatusReport {
        RateLimitStatusReport {
            identity: identity.to_string(),
            generated_at: Utc::now(),
            ai_resource: self
                .limiter
                .status(identity, &RateLimitPolicy::AI_RESOURCE)
                .await,
            user_action: self
                .limiter
                .status(identity, &RateLimitPolicy::USER_ACTION)
                .await,
            general_api: self
                .limiter
                .status(identity, &RateLimitPolicy::GENERAL_API)
                .await,
        }
    }
}
