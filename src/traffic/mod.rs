//! # Traffic Management Module
//!
//! Fixed-window rate limiting over the shared store, protecting the
//! costly upstreams (the AI completion API above all) from concurrent
//! request floods, plus the read-only status aggregation consumed by the
//! dashboard.

pub mod rate_limiting;
pub mod status;

pub use rate_limiting::{
    FixedWindowLimiter, OnBackendError, PolicyStatus, RateLimitDecision, RateLimitError,
    RateLimitMetricsSnapshot, RateLimitPolicy,
};
pub use status::{RateLimitStatusReport, StatusReporter};
