use std::path::PathBuf;
use std::process::Stdio;

use crate::tool::{ToolCommand, ToolError};

/// Abstraction over external tool execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ToolExecutor: Send + Sync {
    /// Resolve a program on `PATH`.
    fn locate(&self, program: &str) -> Result<PathBuf, ToolError>;

    /// Run a command and capture stdout.
    async fn exec(&self, command: &ToolCommand) -> Result<String, ToolError>;

    /// Run a command, streaming output to the terminal.
    async fn exec_streaming(&self, command: &ToolCommand) -> Result<(), ToolError>;

    /// Run a command with data piped to stdin.
    async fn exec_with_stdin(
        &self,
        command: &ToolCommand,
        stdin_data: &[u8],
    ) -> Result<String, ToolError>;
}

/// Spawns real processes via tokio.
pub struct RealExecutor;

impl ToolExecutor for RealExecutor {
    fn locate(&self, program: &str) -> Result<PathBuf, ToolError> {
        which::which(program).map_err(|e| ToolError::NotInstalled {
            program: program.to_owned(),
            source: e,
        })
    }

    async fn exec(&self, command: &ToolCommand) -> Result<String, ToolError> {
        let output = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| spawn_error(command, e))?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ToolError::InvalidUtf8 {
                program: command.program.clone(),
                source: e,
            })
        } else {
            Err(ToolError::CommandFailed {
                command: command.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }

    async fn exec_streaming(&self, command: &ToolCommand) -> Result<(), ToolError> {
        let status = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| spawn_error(command, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::CommandFailed {
                command: command.clone(),
                stderr: format!("exit code: {status}"),
            })
        }
    }

    async fn exec_with_stdin(
        &self,
        command: &ToolCommand,
        stdin_data: &[u8],
    ) -> Result<String, ToolError> {
        use tokio::io::AsyncWriteExt;

        let mut child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(command, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            let stdin_error = |e: std::io::Error| ToolError::StdinWrite {
                program: command.program.clone(),
                source: e,
            };
            stdin.write_all(stdin_data).await.map_err(stdin_error)?;
            stdin.shutdown().await.map_err(stdin_error)?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| spawn_error(command, e))?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ToolError::InvalidUtf8 {
                program: command.program.clone(),
                source: e,
            })
        } else {
            Err(ToolError::CommandFailed {
                command: command.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}

fn spawn_error(command: &ToolCommand, source: std::io::Error) -> ToolError {
    ToolError::Spawn {
        program: command.program.clone(),
        source,
    }
}
