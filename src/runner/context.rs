//! Execution context for task running
//!
//! The context holds the settings shared by every step of a run and the
//! user-facing output helpers.

use colored::Colorize;
use std::env;
use std::path::PathBuf;

/// Execution context shared by every invocation of a run
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory for spawned commands
    pub working_dir: PathBuf,

    /// Configuration file path
    pub config_path: Option<PathBuf>,

    /// Interpreter used to run commands (e.g., ["bash", "-c"])
    pub interpreter: Vec<String>,

    /// Print commands instead of running them
    pub dry_run: bool,

    /// Verbosity level
    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            dry_run: false,
            verbosity: Verbosity::Normal,
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the configuration file path
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".cyan(), message);
        }
    }

    /// Print a command before it runs
    ///
    /// Dry runs always print, since showing the commands is their only effect.
    pub fn print_command(&self, command: &str) {
        if self.dry_run || self.verbosity >= Verbosity::Normal {
            eprintln!("{}", command.bold());
        }
    }

    /// Print task start message
    pub fn print_task_start(&self, invocation: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[TASK]".green(), invocation);
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = Context::new();
        assert_eq!(ctx.verbosity, Verbosity::Normal);
        assert_eq!(ctx.interpreter, vec!["sh", "-c"]);
        assert!(!ctx.dry_run);
        assert!(ctx.config_path.is_none());
    }

    #[test]
    fn test_verbosity_levels() {
        assert!(Verbosity::Verbose > Verbosity::Normal);
        assert!(Verbosity::Normal > Verbosity::Quiet);
        assert!(Verbosity::Quiet > Verbosity::Silent);
    }

    #[test]
    fn test_with_interpreter() {
        let ctx = Context::new().with_interpreter(vec!["bash".to_string(), "-c".to_string()]);
        assert_eq!(ctx.interpreter, vec!["bash", "-c"]);
    }

    #[test]
    fn test_builders() {
        let ctx = Context::new()
            .with_verbosity(Verbosity::Verbose)
            .with_dry_run(true)
            .with_working_dir(PathBuf::from("/tmp"))
            .with_config_path(PathBuf::from("/tmp/runbook.yml"));
        assert_eq!(ctx.verbosity, Verbosity::Verbose);
        assert!(ctx.dry_run);
        assert_eq!(ctx.working_dir, PathBuf::from("/tmp"));
        assert_eq!(ctx.config_path, Some(PathBuf::from("/tmp/runbook.yml")));
    }
}
