//! Log subscriber bootstrap for binaries.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*};

/// Installs a global `fmt` subscriber filtered by `directive`.
///
/// An unparsable directive falls back to `info`. Log lines go to standard
/// error so that standard output stays free for command results.
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber is already installed.
pub fn init(directive: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
}
