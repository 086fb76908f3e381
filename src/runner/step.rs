//! Runtime representation of task steps
//!
//! A [`Step`] is a `config::Step` with every placeholder already substituted.

use crate::config;
use crate::error::InterpolationResult;
use crate::runner::{interpolate, interpolate_list};
use std::collections::HashMap;

/// A fully substituted step, ready to run
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Shell command run through the interpreter
    Command {
        exec: String,
        print: String,
        quiet: bool,
        dir: Option<String>,
    },

    /// Delete files under `dir` except those matching `keep`
    Clean { dir: String, keep: Vec<String> },
}

impl Step {
    /// Substitute parameters and globals into a configured step
    ///
    /// `task_quiet` silences the echo of every command of the task.
    pub fn render(
        step: &config::Step,
        params: &HashMap<String, String>,
        globals: &HashMap<String, String>,
        task_quiet: bool,
    ) -> InterpolationResult<Self> {
        match step {
            config::Step::Command(cmd) => {
                let exec = interpolate(cmd, params, globals)?;
                Ok(Step::Command {
                    print: exec.clone(),
                    exec,
                    quiet: task_quiet,
                    dir: None,
                })
            }
            config::Step::Detailed(detail) => {
                let exec = interpolate(&detail.exec, params, globals)?;
                let print = match &detail.print {
                    Some(print) => interpolate(print, params, globals)?,
                    None => exec.clone(),
                };
                let dir = detail
                    .dir
                    .as_deref()
                    .map(|d| interpolate(d, params, globals))
                    .transpose()?;
                Ok(Step::Command {
                    exec,
                    print,
                    quiet: task_quiet || detail.quiet,
                    dir,
                })
            }
            config::Step::Clean { clean } => Ok(Step::Clean {
                dir: interpolate(&clean.dir, params, globals)?,
                keep: interpolate_list(&clean.keep, params, globals)?,
            }),
        }
    }

    /// What to show the user for this step
    pub fn print(&self) -> String {
        match self {
            Step::Command { print, .. } => print.clone(),
            Step::Clean { dir, keep } if keep.is_empty() => format!("clean {}", dir),
            Step::Clean { dir, keep } => format!("clean {} (keep {})", dir, keep.join(", ")),
        }
    }

    /// Check if this step's echo is suppressed
    pub fn is_quiet(&self) -> bool {
        match self {
            Step::Command { quiet, .. } => *quiet,
            Step::Clean { .. } => false,
        }
    }
}
