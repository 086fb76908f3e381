//! runbook - a YAML task runner with prerequisite tasks
//!
//! Tasks declare parameters, prerequisites and shell steps. Running a task
//! resolves its prerequisites into a deduplicated order, substitutes
//! variables and runs every step in sequence, stopping at the first failure.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, RunbookError};
pub use runner::{Executor, Invocation};

/// Current version of runbook
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
