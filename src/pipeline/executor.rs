//! External command execution.
//!
//! The pipeline never spawns processes directly. It hands a [`CommandSpec`]
//! to a [`CommandExecutor`], which makes the tool replaceable in tests.

use std::ffi::OsString;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ToolError;

/// A program and its argument vector. Arguments are passed verbatim, no shell
/// is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {:?}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// What a finished process reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Whether the exit status was success
    pub success: bool,

    /// Exit code, if the process exited normally
    pub code: Option<i32>,

    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// Human-readable exit status.
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }

    /// The text to inspect and report when the process failed.
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        match (stderr.is_empty(), stdout.is_empty()) {
            (false, true) => stderr.to_string(),
            (true, false) => stdout.to_string(),
            (false, false) => format!("{stderr}\n{stdout}"),
            (true, true) => String::new(),
        }
    }
}

/// Runs external commands to completion.
#[async_trait]
pub trait CommandExecutor: Send + Sync + 'static {
    /// Run `command` and wait for it, giving up after `timeout`.
    async fn execute(&self, command: &CommandSpec, timeout: Duration)
        -> Result<ExecOutput, ToolError>;
}

/// Executor backed by `tokio::process`.
///
/// A child that outlives its timeout is killed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(
        &self,
        command: &CommandSpec,
        timeout: Duration,
    ) -> Result<ExecOutput, ToolError> {
        debug!(command = %command, "Spawning process");

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::Spawn {
                program: command.program.clone(),
                message: e.to_string(),
            })?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ToolError::Spawn {
                program: command.program.clone(),
                message: e.to_string(),
            })?,
            Err(_) => {
                return Err(ToolError::Timeout {
                    program: command.program.clone(),
                    secs: timeout.as_secs(),
                })
            }
        };

        Ok(ExecOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
