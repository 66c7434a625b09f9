//! # Cache Key Registry
//!
//! Pure, deterministic builders mapping a semantic cache category plus
//! its parameters to a key string, paired with one fixed TTL per
//! category. Identical inputs always produce identical keys; the store
//! adapter adds the namespace prefix.

use sha2::{Digest, Sha256};
use std::time::Duration;

/// Number of content characters folded into the FAQ cache key
const FAQ_PREFIX_CHARS: usize = 50;

/// Semantic cache categories with their fixed TTLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    ContentGeneration,
    FaqGeneration,
    MetaGeneration,
    PageData,
    PageList,
    RateLimit,
    SecurityEvents,
    ThreatScore,
    Analytics,
}

impl CacheCategory {
    /// Fixed TTL for entries in this category
    pub fn ttl(self) -> Duration {
        let secs = match self {
            Self::ContentGeneration => 3600,
            Self::FaqGeneration => 3600,
            Self::MetaGeneration => 7200,
            Self::PageData => 1800,
            Self::PageList => 900,
            Self::RateLimit => 60,
            Self::SecurityEvents => 300,
            Self::ThreatScore => 300,
            Self::Analytics => 3600,
        };
        Duration::from_secs(secs)
    }
}

/// Key for AI-generated page content, built from the keyword signature.
/// Keywords are trimmed and lowercased so that equivalent requests share
/// one entry regardless of input casing.
pub fn content_generation<S: AsRef<str>>(keywords: &[S]) -> String {
    let signature = keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(",");
    format!("content:{signature}")
}

/// Key for generated FAQ sections, built from the first
/// [`FAQ_PREFIX_CHARS`] characters of the page content.
///
/// This is a deliberate approximate key: two long contents sharing a
/// 50-character prefix collide and will serve each other's FAQ. The
/// trade-off keeps keys short for content that is itself cache-derived
/// and near-deterministic per keyword set. Callers that cannot tolerate
/// prefix collisions should use [`faq_generation_hashed`] instead.
pub fn faq_generation(content: &str) -> String {
    let prefix: String = content.chars().take(FAQ_PREFIX_CHARS).collect();
    format!("faq:{prefix}")
}

/// Collision-free alternative to [`faq_generation`]: keys on a SHA-256
/// digest of the full content.
pub fn faq_generation_hashed(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("faq:sha256:{digest:x}")
}

/// Key for generated meta title/description per keyword
pub fn meta_generation(keyword: &str) -> String {
    format!("meta:{}", keyword.trim().to_lowercase())
}

/// Key for a rate-limit counter per (identity, endpoint)
pub fn rate_limit(identity: &str, endpoint: &str) -> String {
    format!("ratelimit:{identity}:{endpoint}")
}

/// Key for a rendered page looked up by handle
pub fn page_data(handle: &str) -> String {
    format!("page:{handle}")
}

/// Key for a filtered page listing
pub fn page_list(filter: &str) -> String {
    format!("pages:{filter}")
}

/// Key for recent security events per client identity
pub fn security_events(identity: &str) -> String {
    format!("security:events:{identity}")
}

/// Key for the computed threat score per client identity
pub fn threat_score(identity: &str) -> String {
    format!("security:threat:{identity}")
}

/// Key for an analytics rollup per (kind, date)
pub fn analytics(kind: &str, date: &str) -> String {
    format!("analytics:{kind}:{date}")
}
