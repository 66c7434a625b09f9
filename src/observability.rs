//! # Observability
//!
//! Logging initialization for the embedding application. Components in
//! this crate only emit `tracing` events; installing a subscriber is the
//! application's choice, made once at process start.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the JSON log subscriber with an environment-driven filter.
///
/// Safe to call more than once; only the first call installs a
/// subscriber. The filter defaults to `contentforge_cache=info` when
/// `RUST_LOG` is unset.
pub fn init_logging() {
    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .json(),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contentforge_cache=info".into()),
        );

    if registry.try_init().is_ok() {
        info!("logging initialized");
    }
}
