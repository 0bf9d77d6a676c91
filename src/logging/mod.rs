//! Structured logging setup, trimmed from the teacher's production
//! logger down to the one knob this core needs: a verbosity filter
//! string handed straight to `tracing_subscriber`.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `verbosity` is an
/// `EnvFilter`-compatible directive string (e.g. `"info"`,
/// `"hearts_ring=debug,warn"`).
pub fn init_logging(verbosity: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(verbosity))
        .init();
}
