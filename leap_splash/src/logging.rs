//! Console logging setup.

use tracing_subscriber::EnvFilter;

use crate::error::{SplashError, SplashResult};

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `verbose`.
/// Stdout stays clean for the stdout publisher.
pub fn init_logging(verbose: bool) -> SplashResult<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter  = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| SplashError::Logging(e.to_string()))
}
