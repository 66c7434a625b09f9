//! # Core Module
//!
//! Process-wide configuration shared by the caching and traffic layers.

pub mod config;

pub use config::{Config, RateLimitSettings};
