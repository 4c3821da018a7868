//! # Telemetry
//!
//! Tracing subscriber setup for hosts embedding the facade.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// Default level is INFO; override with `RUST_LOG` (e.g.
/// `RUST_LOG=nabil_sync=debug`). Safe to call more than once - later
/// calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
