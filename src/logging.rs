//! Logging initialisation.
//!
//! Console output goes through `tracing` with an [`EnvFilter`]: the default
//! level is `warn` so normal runs stay quiet, `--verbose` raises it to
//! `info` (one line per created link, per synced repository, and so on) and
//! `--debug` to `debug`. `RUST_LOG` overrides both flags when set.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Called exactly once, before any command runs. Later calls are ignored,
/// which keeps test processes that initialise twice from panicking.
pub fn init(verbose: bool, debug: bool) {
    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_default();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
