//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory with a runbook.yml file
pub fn create_test_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("runbook.yml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Lines appended to `log` by test steps, in order
pub fn read_log(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// A toolchain-shaped config: `run` depends on `build`, whose four steps
/// stand in for compile, assemble helper, assemble target and link.
///
/// `fail_at` makes the matching build step exit with status 9.
pub fn toolchain_config(fail_at: Option<usize>) -> String {
    let steps = ["compile", "assemble-helper", "assemble", "link"];
    let build_steps: String = steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let fail = if fail_at == Some(i + 1) { " && exit 9" } else { "" };
            format!("      - echo {} ${{name}} >> log{}\n", step, fail)
        })
        .collect();

    format!(
        r#"
variables:
  root: .
  build_dir: "${{root}}/build"
tasks:
  build:
    params: [name]
    run:
{build_steps}
  run:
    params: [name]
    deps: ["build ${{name}}"]
    run: echo run ${{build_dir}}/${{name}} >> log
"#
    )
}
