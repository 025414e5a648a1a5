//! Logging setup shared by ipmesh binaries and tests.
//!
//! Thin wrapper around `tracing-subscriber` so every process configures
//! logging the same way: `RUST_LOG` wins, otherwise the caller's default
//! filter applies.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with an `info` default filter.
pub fn init() {
    init_with_default("info");
}

/// Initialize logging, using `default` when `RUST_LOG` is unset.
///
/// Safe to call more than once; later calls are no-ops, which keeps test
/// binaries from fighting over the global subscriber.
pub fn init_with_default(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt().with_env_filter(filter).try_init();
}
