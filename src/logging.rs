//! Diagnostic logging using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--verbose` (debug)
//! 2. `RUNBOOK_LOG` environment variable (e.g. "info", "trace")
//! 3. default to `warn`
//!
//! Logs go to stderr so they never mix with the output of task commands.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::runner::Verbosity;

/// Environment variable consulted for the log level
pub const LOG_ENV: &str = "RUNBOOK_LOG";

/// Initialise the global logging subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(verbosity: Verbosity) -> Result<()> {
    let level = match verbosity {
        Verbosity::Verbose => Level::DEBUG,
        _ => std::env::var(LOG_ENV)
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(Level::WARN),
    };

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
