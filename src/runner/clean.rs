//! The built-in clean step
//!
//! Removes every file under a directory except those matching a set of
//! keep-patterns. Directories themselves are left in place.

use crate::error::{ExecutionError, ExecutionResult};
use glob::Pattern;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Delete all files under `dir` that match none of `keep`
///
/// A pattern matches either the file name or the path relative to `dir`.
/// A missing directory is not an error. Returns the number of files removed.
pub fn clean_dir(dir: &Path, keep: &[String]) -> ExecutionResult<usize> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "nothing to clean");
        return Ok(0);
    }

    let keep_set = build_keep_set(keep)?;
    let mut removed = 0;

    for path in list_entries(dir)? {
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(source) => return Err(ExecutionError::Clean { path, source }),
        };
        if metadata.is_dir() {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(&path);
        let name_kept = path
            .file_name()
            .map_or(false, |name| keep_set.is_match(name));
        if name_kept || keep_set.is_match(relative) {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(ExecutionError::Clean { path, source }),
        }
    }

    debug!(dir = %dir.display(), removed, "cleaned");
    Ok(removed)
}

/// Every entry below `dir`, collected up front so removal does not race the walk
fn list_entries(dir: &Path) -> ExecutionResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/*",
        Pattern::escape(&dir.to_string_lossy())
    );

    let entries = glob::glob(&pattern).map_err(|e| ExecutionError::InvalidPattern {
        pattern: pattern.clone(),
        error: e.to_string(),
    })?;

    entries
        .map(|entry| {
            entry.map_err(|e| ExecutionError::Clean {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })
        })
        .collect()
}

fn build_keep_set(keep: &[String]) -> ExecutionResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in keep {
        let glob = Glob::new(pattern).map_err(|e| ExecutionError::InvalidPattern {
            pattern: pattern.clone(),
            error: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ExecutionError::InvalidPattern {
        pattern: keep.join(", "),
        error: e.to_string(),
    })
}
