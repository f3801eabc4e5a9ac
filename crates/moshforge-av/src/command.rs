//! Builder for executing external tool commands with captured output.

use std::path::PathBuf;
use std::process::ExitStatus;

use crate::{Error, Result};

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// Execution is blocking and runs the tool to completion; stdout and stderr
/// are captured in full so failures can be reported with the tool's own
/// diagnostics.
///
/// # Example
///
/// ```no_run
/// use moshforge_av::ToolCommand;
/// use std::path::PathBuf;
///
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-i").arg("/path/to/input.mp4")
///     .arg("-f").arg("avi")
///     .arg("/path/to/output.avi")
///     .execute()?;
/// println!("{}", output.stderr);
/// # Ok::<(), moshforge_av::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Execute the command, blocking until it exits.
    ///
    /// # Errors
    ///
    /// - Returns [`Error::ToolFailed`] if spawning the process fails.
    /// - Returns [`Error::ToolFailed`] if the process exits with a non-zero
    ///   status (message includes stderr).
    pub fn execute(&self) -> Result<ToolOutput> {
        let program_name = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string());

        tracing::debug!("executing {} {:?}", program_name, self.args);

        let output = std::process::Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| Error::tool_failed(&program_name, format!("failed to spawn: {e}")))?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(Error::tool_failed(
                &program_name,
                format!(
                    "exited with status {}: {}",
                    output.status,
                    tool_output.stderr.trim()
                ),
            ));
        }

        Ok(tool_output)
    }
}
