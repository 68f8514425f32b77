//! Logging setup.
//!
//! The framework only emits `tracing` events; installing a subscriber is up
//! to the binary. [`init`] is the usual choice: a fmt subscriber filtered by
//! `RUST_LOG`, falling back to `info`.

use tracing_subscriber::{EnvFilter, fmt, util::TryInitError};

pub const DEFAULT_FILTER: &str = "info";

/// Install the global fmt subscriber.
///
/// Fails if another global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    init_with_filter(DEFAULT_FILTER)
}

/// Install the global fmt subscriber with `default_filter` used when
/// `RUST_LOG` is unset or invalid.
pub fn init_with_filter(default_filter: &str) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
}
