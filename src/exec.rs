//! External process helpers.
//!
//! Two flavours: [`run_interactive`] inherits the parent's stdio so the
//! child can drive pagers, editors, and credential prompts; [`run_captured`]
//! collects output for queries. Both block until the child exits — there is
//! no timeout and no concurrency anywhere in this tool.

use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of a captured command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
    /// Whether the command exited zero.
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Run a command in `dir` with stdin/stdout/stderr inherited from the
/// current process, and return its exit code (`-1` when killed by a signal).
pub fn run_interactive(dir: &Path, program: &str, args: &[&str]) -> io::Result<i32> {
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;
    Ok(status.code().unwrap_or(-1))
}

/// Run a command in `dir` and capture its output.
pub fn run_captured(dir: &Path, program: &str, args: &[&str]) -> io::Result<ExecResult> {
    let output = Command::new(program).args(args).current_dir(dir).output()?;
    Ok(ExecResult::from(output))
}

/// Render a command line for log and error messages.
#[must_use]
pub fn display_command(program: &str, args: &[&str]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        if arg.contains(' ') {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}
