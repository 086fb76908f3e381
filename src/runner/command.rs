//! Command execution
//!
//! This module handles executing shell commands.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::Context;
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use tracing::debug;

/// Run `exec` through the context's interpreter and wait for it
///
/// Stdio and environment are inherited. A non-zero exit becomes
/// [`ExecutionError::ProcessFailure`] carrying the child's exit code.
pub fn execute_command(exec: &str, dir: Option<&str>, ctx: &Context) -> ExecutionResult<()> {
    let (program, interpreter_args) = ctx.interpreter.split_first().ok_or_else(|| {
        ExecutionError::Environment("interpreter must name a program".to_string())
    })?;

    // Determine working directory
    let working_dir = match dir {
        Some(dir) => ctx.working_dir.join(dir),
        None => ctx.working_dir.clone(),
    };

    let mut command = StdCommand::new(program);
    command
        .args(interpreter_args)
        .arg(exec)
        .current_dir(&working_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    debug!(%exec, dir = %working_dir.display(), "spawning");

    let status = command.status().map_err(|source| ExecutionError::Spawn {
        command: exec.to_string(),
        source,
    })?;

    if !status.success() {
        return Err(ExecutionError::ProcessFailure {
            command: exec.to_string(),
            code: exit_code(status),
        });
    }

    Ok(())
}

/// Exit code of a finished child; 128 + signal when it was killed on Unix
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_execute_simple_command() {
        let ctx = Context::new();
        assert!(execute_command("echo test", None, &ctx).is_ok());
    }

    #[test]
    fn test_execute_failing_command_keeps_code() {
        let ctx = Context::new();
        let result = execute_command("exit 7", None, &ctx);
        assert!(matches!(
            result,
            Err(ExecutionError::ProcessFailure { code: 7, .. })
        ));
    }

    #[test]
    fn test_execute_in_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        let ctx = Context::new().with_working_dir(temp_dir.path().to_path_buf());

        execute_command("touch marker", Some("sub"), &ctx).unwrap();
        assert!(temp_dir.path().join("sub/marker").exists());
    }

    #[test]
    fn test_missing_interpreter_is_spawn_error() {
        let ctx = Context::new().with_interpreter(vec![
            "definitely-not-an-interpreter-xyz".to_string(),
            "-c".to_string(),
        ]);
        let result = execute_command("true", None, &ctx);
        assert!(matches!(result, Err(ExecutionError::Spawn { .. })));
    }

    #[test]
    fn test_empty_interpreter() {
        let ctx = Context::new().with_interpreter(Vec::new());
        let result = execute_command("true", None, &ctx);
        assert!(matches!(result, Err(ExecutionError::Environment(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_killed_by_signal() {
        let ctx = Context::new();
        let result = execute_command("kill -9 $$", None, &ctx);
        assert!(matches!(
            result,
            Err(ExecutionError::ProcessFailure { code: 137, .. })
        ));
    }
}
