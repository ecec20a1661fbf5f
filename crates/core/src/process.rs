//! Process execution utilities
//!
//! Provides a unified interface for running external commands with:
//! - Output capture
//! - Directory context
//! - PATH lookup

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// Exit code of the command
    pub exit_code: i32,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandResult {
    /// Create from `std::process::Output`
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// First non-blank stdout line, trimmed
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.lines().map(str::trim).find(|line| !line.is_empty())
    }

    /// Get combined output (stdout + stderr)
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Run a command and capture output
///
/// # Errors
///
/// Fails when the program cannot be spawned. A non-zero exit is reported
/// through [`CommandResult::success`], not as an error.
pub fn run_command(program: &str, args: &[&str]) -> Result<CommandResult> {
    capture(program, args, None)
}

/// Run a command in a specific directory
///
/// # Errors
///
/// Fails when the program cannot be spawned.
pub fn run_command_in_dir(program: &str, args: &[&str], dir: &Path) -> Result<CommandResult> {
    capture(program, args, Some(dir))
}

fn capture(program: &str, args: &[&str], dir: Option<&Path>) -> Result<CommandResult> {
    let mut command = Command::new(program);
    command.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    tracing::debug!(program, ?args, dir = ?dir, "running command");

    let output = command.output().map_err(|e| spawn_error(program, e))?;
    let result = CommandResult::from_output(output);
    tracing::trace!(program, exit_code = result.exit_code, "command finished");
    Ok(result)
}

fn spawn_error(program: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::command_not_found(program).with_source(err)
    } else {
        Error::process(format!("Failed to execute {program}: {err}")).with_source(err)
    }
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Get the path to a command
pub fn which_command(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[cfg(unix)]
    #[test]
    fn test_command_exists_sh() {
        assert!(command_exists("sh"));
        assert!(which_command("sh").is_some());
    }

    #[test]
    fn test_command_exists_nonexistent() {
        assert!(!command_exists("nonexistent_command_12345"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_echo() {
        let result = run_command("echo", &["hello"]).unwrap();
        assert!(result.success);
        assert!(result.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let result = run_command_in_dir("ls", &[], dir.path()).unwrap();
        assert!(result.stdout.contains("marker.txt"));
    }

    #[test]
    fn test_run_missing_command() {
        let err = run_command("nonexistent_command_12345", &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandNotFound);
    }

    #[test]
    fn test_command_result_combined_output() {
        let result = CommandResult {
            success: true,
            exit_code: 0,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert!(result.combined_output().contains("out"));
        assert!(result.combined_output().contains("err"));
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        let result = CommandResult {
            success: true,
            exit_code: 0,
            stdout: "\n   \n  androidx.core:core-ktx:1.13.1  \nmore\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(result.first_line(), Some("androidx.core:core-ktx:1.13.1"));
    }
}
