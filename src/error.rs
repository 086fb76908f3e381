//! Error types for runbook

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for runbook operations
pub type Result<T> = std::result::Result<T, RunbookError>;

/// Exit code reserved for errors detected before any process is spawned
pub const EXIT_RESOLUTION: i32 = 1;

/// Exit code used when a step's interpreter cannot be started at all
pub const EXIT_SPAWN: i32 = 127;

/// Main error type for runbook
#[derive(Error, Debug)]
pub enum RunbookError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while expanding a task into invocations
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// Task execution errors
    #[error("{0}")]
    Execution(#[from] ExecutionError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RunbookError {
    /// Process exit code to report for this error
    ///
    /// A failing step surfaces its own exit code; everything detected before
    /// a process runs maps to [`EXIT_RESOLUTION`].
    pub fn exit_code(&self) -> i32 {
        match self {
            RunbookError::Execution(e) => e.exit_code(),
            _ => EXIT_RESOLUTION,
        }
    }
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{name}' is not defined (referenced by {referenced_by})")]
    UnknownTask { name: String, referenced_by: String },

    #[error("Circular dependency detected: {0}")]
    CyclicDependency(String),

    #[error("Task '{task}' declares parameter '{param}' more than once")]
    DuplicateParameter { task: String, param: String },

    #[error("Task '{task}': required parameter '{param}' follows a parameter with a default")]
    RequiredAfterOptional { task: String, param: String },

    #[error("Task '{task}' passes {got} argument(s) to '{dependency}', which takes at most {expected}")]
    DependencyArity {
        task: String,
        dependency: String,
        expected: usize,
        got: usize,
    },

    #[error("Task '{task}' does not pass required parameter '{param}' to '{dependency}'")]
    MissingDependencyArgument {
        task: String,
        dependency: String,
        param: String,
    },

    #[error("Variable '{name}' is not defined (used in {context})")]
    UndefinedVariable { name: String, context: String },

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// Errors raised while resolving a requested task into invocations
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Task '{0}' is not defined")]
    UnknownTask(String),

    #[error("Circular dependency detected: {0}")]
    CyclicDependency(String),

    #[error("Task '{task}' requires parameter '{param}'")]
    MissingParameter { task: String, param: String },

    #[error("Task '{task}' takes at most {expected} argument(s) but {got} were given")]
    TooManyArguments {
        task: String,
        expected: usize,
        got: usize,
    },

    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command `{command}` failed with exit code {code}")]
    ProcessFailure { command: String, code: i32 },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to clean '{}': {source}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl ExecutionError {
    /// Exit code this failure should be surfaced as
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecutionError::ProcessFailure { code, .. } => *code,
            ExecutionError::Spawn { .. } => EXIT_SPAWN,
            _ => EXIT_RESOLUTION,
        }
    }
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Invalid interpolation syntax: {0}")]
    InvalidSyntax(String),

    #[error("Variables reference each other in a cycle: {0}")]
    CyclicVariable(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for resolution operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failure_keeps_exit_code() {
        let err: RunbookError = ExecutionError::ProcessFailure {
            command: "false".to_string(),
            code: 3,
        }
        .into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_resolution_errors_use_reserved_code() {
        let err: RunbookError = ResolveError::UnknownTask("nope".to_string()).into();
        assert_eq!(err.exit_code(), EXIT_RESOLUTION);
        assert!(err.to_string().contains("nope"));

        let err: RunbookError = ConfigError::CyclicDependency("a -> a".to_string()).into();
        assert_eq!(err.exit_code(), EXIT_RESOLUTION);
    }

    #[test]
    fn test_spawn_failure_code() {
        let err = ExecutionError::Spawn {
            command: "missing".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.exit_code(), EXIT_SPAWN);
    }
}
