//! `tracing` subscriber setup for the binaries.

use tracing_subscriber::EnvFilter;

/// Maps `-q`/default/`-v` to a default filter level.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs a stderr fmt subscriber. `RUST_LOG` wins over `verbosity`.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("droprate={}", level_for_verbosity(verbosity))));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
