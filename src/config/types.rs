//! Core configuration types
//!
//! This module defines the data structures that represent a runbook.yml file.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Application name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Application usage description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Global interpreter to use for commands (e.g., ["sh", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Load a `.env` file next to the config before running anything
    #[serde(default)]
    pub dotenv: bool,

    /// Task to run when none is named on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Global variables, possibly derived from each other with `${name}`
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_variables"
    )]
    pub variables: BTreeMap<String, String>,

    /// Tasks defined in the configuration
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Task {
    /// Usage description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Longer description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this task is private (hidden from help and listing)
    #[serde(default)]
    pub private: bool,

    /// Whether this task should run without echoing its commands
    #[serde(default)]
    pub quiet: bool,

    /// Positional parameters, in the order arguments are supplied
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_one_or_many"
    )]
    pub params: Vec<Param>,

    /// Prerequisites, run before this task's own steps
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_one_or_many"
    )]
    pub deps: Vec<Dependency>,

    /// Steps to execute
    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub run: Vec<Step>,
}

impl Task {
    /// Number of parameters that have no default
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| p.default().is_none()).count()
    }
}

/// A positional task parameter
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Param {
    /// Bare parameter name; the value is required
    Simple(String),

    /// Parameter with a default or usage text
    Detailed(ParamDetail),
}

/// Detailed parameter specification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParamDetail {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

impl Param {
    pub fn name(&self) -> &str {
        match self {
            Param::Simple(name) => name,
            Param::Detailed(detail) => &detail.name,
        }
    }

    pub fn default(&self) -> Option<&str> {
        match self {
            Param::Simple(_) => None,
            Param::Detailed(detail) => detail.default.as_deref(),
        }
    }

    pub fn usage(&self) -> Option<&str> {
        match self {
            Param::Simple(_) => None,
            Param::Detailed(detail) => detail.usage.as_deref(),
        }
    }
}

/// A reference to a prerequisite task
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Dependency {
    /// `"name arg1 arg2"`, split on whitespace
    Simple(String),

    /// Explicit task name and argument list
    Detailed(DependencyDetail),
}

/// Detailed dependency specification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DependencyDetail {
    /// Name of the task to run first
    pub task: String,

    /// Argument templates passed to the task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Dependency {
    /// Task name and argument templates of this dependency
    pub fn parts(&self) -> (&str, Vec<&str>) {
        match self {
            Dependency::Simple(spec) => {
                let mut words = spec.split_whitespace();
                let name = words.next().unwrap_or_default();
                (name, words.collect())
            }
            Dependency::Detailed(detail) => (
                detail.task.as_str(),
                detail.args.iter().map(String::as_str).collect(),
            ),
        }
    }

    /// Name of the referenced task
    pub fn task_name(&self) -> &str {
        self.parts().0
    }
}

/// A single step of a task body
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Step {
    /// Simple string command
    Command(String),

    /// Built-in clean step
    Clean { clean: CleanSpec },

    /// Command with additional options
    Detailed(CommandDetail),
}

/// Detailed command specification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandDetail {
    /// The command to execute
    pub exec: String,

    /// What to print when running (defaults to exec)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print: Option<String>,

    /// Whether to suppress the command echo
    #[serde(default)]
    pub quiet: bool,

    /// Working directory for the command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Files to delete and files to keep for a clean step
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanSpec {
    /// Directory whose files are removed
    pub dir: String,

    /// Glob patterns of files that survive
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_one_or_many"
    )]
    pub keep: Vec<String>,
}

impl Step {
    /// Every template string of this step that may hold placeholders
    pub fn templates(&self) -> Vec<&str> {
        match self {
            Step::Command(cmd) => vec![cmd.as_str()],
            Step::Clean { clean } => std::iter::once(clean.dir.as_str())
                .chain(clean.keep.iter().map(String::as_str))
                .collect(),
            Step::Detailed(detail) => std::iter::once(detail.exec.as_str())
                .chain(detail.print.as_deref())
                .chain(detail.dir.as_deref())
                .collect(),
        }
    }
}

/// Deserializer accepting either a single value or a list of values
fn deserialize_one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| T::deserialize(item).map_err(D::Error::custom))
            .collect(),
        // Null or not present
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![T::deserialize(other).map_err(D::Error::custom)?]),
    }
}

/// Deserializer for variables that accepts any scalar value
fn deserialize_variables<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;

    raw.into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                _ => {
                    return Err(D::Error::custom(format!(
                        "variable '{}' must be a string, number, or boolean",
                        name
                    )))
                }
            };
            Ok((name, text))
        })
        .collect()
}
