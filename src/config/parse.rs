//! Configuration file parsing and discovery

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, RunbookError};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["runbook.yml", "runbook.yaml"];

/// Find the configuration file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the configuration file starting from a specific directory
///
/// Falls back to the user's global runbook in the platform config directory
/// when no ancestor holds one.
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut searched_paths = Vec::new();

    if let Some(found) = search_ancestors(&start_dir, &mut searched_paths) {
        return Ok(found);
    }

    if let Some(global_dir) = global_config_dir() {
        if let Some(found) = search_dir(&global_dir, &mut searched_paths) {
            debug!(path = %found.display(), "using global config file");
            return Ok(found);
        }
    }

    Err(ConfigError::NotFound(searched_paths.join(", ")))
}

/// Search `start_dir` and each of its parents
fn search_ancestors(start_dir: &Path, searched_paths: &mut Vec<String>) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find_map(|dir| search_dir(dir, searched_paths))
}

fn search_dir(dir: &Path, searched_paths: &mut Vec<String>) -> Option<PathBuf> {
    for file_name in CONFIG_FILE_NAMES {
        let config_path = dir.join(file_name);
        searched_paths.push(config_path.display().to_string());

        if config_path.is_file() {
            return Some(config_path);
        }
    }
    None
}

/// Directory holding the user's global runbook file
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "runbook").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, RunbookError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    parse_config(&contents)
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str) -> Result<Config, RunbookError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

/// Parse configuration with automatic file discovery
pub fn parse_config_auto() -> Result<(Config, PathBuf), RunbookError> {
    let config_path = find_config_file()?;
    let config = parse_config_file(&config_path)?;
    Ok((config, config_path))
}

/// Load the `.env` file that sits next to the config file, if any
///
/// Variables already present in the environment are left untouched.
pub fn load_dotenv(config_path: &Path) -> ConfigResult<Option<PathBuf>> {
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let env_path = base_dir.join(".env");

    if !env_path.is_file() {
        return Ok(None);
    }

    dotenvy::from_path(&env_path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to load '{}': {}", env_path.display(), e))
    })?;
    debug!(path = %env_path.display(), "loaded environment file");

    Ok(Some(env_path))
}
