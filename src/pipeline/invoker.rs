//! Page extraction jobs.
//!
//! A [`ProcessingJob`] moves through `Created → Running → Succeeded | Failed`.
//! On success its files are handed to delivery as [`JobArtifacts`]; on failure
//! both files are removed before the error is returned.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::ToolError;

use super::delivery::JobArtifacts;
use super::executor::{CommandExecutor, CommandSpec};
use super::intake::UploadedFile;
use super::scratch::{ScratchFile, ScratchSpace};

/// Default extraction program.
pub const DEFAULT_PDFTK_PATH: &str = "pdftk";

/// The page extracted from every upload.
pub const EXTRACTED_PAGE: u32 = 2;

/// Default time limit for one tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Running,
    Succeeded,
    Failed,
}

// =============================================================================
// Processing Job
// =============================================================================

/// One upload-to-output transformation attempt.
#[derive(Debug)]
pub struct ProcessingJob {
    input: UploadedFile,
    output: ScratchFile,
    command: CommandSpec,
    state: JobState,
}

impl ProcessingJob {
    pub fn input(&self) -> &UploadedFile {
        &self.input
    }

    pub fn output_path(&self) -> &Path {
        self.output.path()
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    fn transition(&mut self, next: JobState) {
        debug!(from = ?self.state, to = ?next, input = %self.input.path().display(), "Job state change");
        self.state = next;
    }

    /// Run the command and interpret the outcome.
    pub async fn run(
        mut self,
        executor: &dyn CommandExecutor,
        timeout: Duration,
    ) -> Result<JobArtifacts, ToolError> {
        self.transition(JobState::Running);

        let result = match executor.execute(&self.command, timeout).await {
            Ok(output) if output.success => {
                if path_exists(self.output.path()).await {
                    Ok(())
                } else {
                    Err(ToolError::MissingOutput)
                }
            }
            Ok(output) => Err(ToolError::Failed {
                status: output.status_text(),
                output: output.failure_text(),
            }),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.transition(JobState::Succeeded);
                info!(
                    input = %self.input.path().display(),
                    output = %self.output.path().display(),
                    "Page extracted"
                );
                Ok(JobArtifacts::new(self.input, self.output))
            }
            Err(err) => {
                self.transition(JobState::Failed);
                warn!(
                    input = %self.input.path().display(),
                    error = %err,
                    "Page extraction failed"
                );
                self.input.remove().await;
                self.output.remove().await;
                Err(err)
            }
        }
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

// =============================================================================
// Page Extractor
// =============================================================================

/// Builds and runs extraction jobs against an injected executor.
#[derive(Clone)]
pub struct PageExtractor {
    executor: Arc<dyn CommandExecutor>,
    scratch: ScratchSpace,
    program: String,
    page: u32,
    timeout: Duration,
}

impl PageExtractor {
    pub fn new(executor: Arc<dyn CommandExecutor>, scratch: ScratchSpace) -> Self {
        Self {
            executor,
            scratch,
            program: DEFAULT_PDFTK_PATH.to_string(),
            page: EXTRACTED_PAGE,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Use a different pdftk binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `pdftk <input> cat <page> output <output>`
    pub fn build_command(&self, input: &Path, output: &Path) -> CommandSpec {
        CommandSpec::new(&self.program)
            .arg(input)
            .arg("cat")
            .arg(self.page.to_string())
            .arg("output")
            .arg(output)
    }

    /// Create a job for an upload. The output path is derived from the
    /// upload's unique suffix.
    pub fn prepare(&self, input: UploadedFile) -> ProcessingJob {
        let output = ScratchFile::new(self.scratch.output_path_for(input.suffix()));
        let command = self.build_command(input.path(), output.path());

        ProcessingJob {
            input,
            output,
            command,
            state: JobState::Created,
        }
    }

    /// Prepare and run a job in one step.
    pub async fn process(&self, input: UploadedFile) -> Result<JobArtifacts, ToolError> {
        let job = self.prepare(input);
        job.run(self.executor.as_ref(), self.timeout).await
    }
}

impl std::fmt::Debug for PageExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageExtractor")
            .field("program", &self.program)
            .field("page", &self.page)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
