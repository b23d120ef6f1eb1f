//! Process-wide tracing subscriber.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppMode;

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// mode's default filter.
///
/// Returns an error if a subscriber was already installed.
pub fn init(mode: AppMode) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(mode.default_log_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(mode == AppMode::Debug))
        .try_init()
}
