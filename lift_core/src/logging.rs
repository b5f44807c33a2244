//! Diagnostics for a running session.
//!
//! Session output (steps, countdown warnings, the summary) is printed by the
//! host on stdout. Everything logged through `tracing` goes to stderr instead:
//! plan and config loading at INFO, queue building and advance tickets at
//! DEBUG. `RUST_LOG` overrides the default level.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the subscriber for the `lift` binary
///
/// `quiet` keeps stderr to warnings and errors so it never interleaves with
/// a session's countdown.
pub fn init_for_cli(quiet: bool) {
    init_with_level(if quiet { "warn" } else { "info" })
}

/// Install a compact stderr subscriber filtered at `default_level` unless
/// `RUST_LOG` is set
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route DEBUG logs into the test harness output
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
