//! CLI interface and argument parsing
//!
//! This module builds the command line from the loaded configuration:
//! every public task becomes a subcommand.

pub mod app;

// Re-export main types
pub use app::*;
