//! Task execution engine
//!
//! This module handles variable resolution, prerequisite resolution, and
//! the sequential execution of task steps.

pub mod clean;
pub mod command;
pub mod context;
pub mod executor;
pub mod graph;
pub mod interpolate;
pub mod step;
pub mod variables;

// Re-export main types
pub use clean::*;
pub use command::*;
pub use context::*;
pub use executor::*;
pub use graph::*;
pub use interpolate::*;
pub use step::*;
pub use variables::*;
