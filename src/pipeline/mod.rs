//! The upload → extract → deliver pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌──────────────┐
//! │ UploadIntake │───▶│ PageExtractor │───▶│   deliver    │
//! │  (multipart) │    │ (pdftk job)   │    │ (body stream)│
//! └──────┬───────┘    └───────┬───────┘    └──────┬───────┘
//!        │                    │                   │
//!        ▼                    ▼                   ▼
//!   UploadedFile      CommandExecutor trait   JobArtifacts
//!   (self-deleting)   (process or mock)       (released on stream end)
//! ```
//!
//! All temporary files are owned by guards, so every exit path (rejection,
//! tool failure, dropped request, finished download) removes them.

pub mod delivery;
pub mod executor;
pub mod intake;
pub mod invoker;
pub mod scratch;

use std::sync::Arc;
use std::time::Duration;

pub use delivery::{deliver, JobArtifacts, TransferOutcome, DOWNLOAD_FILENAME};
pub use executor::{CommandExecutor, CommandSpec, ExecOutput, ProcessExecutor};
pub use intake::{UploadIntake, UploadedFile, MAX_UPLOAD_SIZE, PDF_MEDIA_TYPE, UPLOAD_FIELD};
pub use invoker::{
    JobState, PageExtractor, ProcessingJob, DEFAULT_PDFTK_PATH, DEFAULT_TOOL_TIMEOUT,
    EXTRACTED_PAGE,
};
pub use scratch::{ScratchFile, ScratchSpace, DEFAULT_OUTPUT_DIR, DEFAULT_UPLOAD_DIR};

/// Intake and extraction sharing one scratch space.
#[derive(Debug, Clone)]
pub struct Pipeline {
    intake: UploadIntake,
    extractor: PageExtractor,
}

impl Pipeline {
    pub fn new(scratch: ScratchSpace, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            intake: UploadIntake::new(scratch.clone()),
            extractor: PageExtractor::new(executor, scratch),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.extractor = self.extractor.with_program(program);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.extractor = self.extractor.with_timeout(timeout);
        self
    }

    pub fn with_max_upload_size(mut self, max_size: u64) -> Self {
        self.intake = self.intake.with_max_size(max_size);
        self
    }

    pub fn intake(&self) -> &UploadIntake {
        &self.intake
    }

    pub fn extractor(&self) -> &PageExtractor {
        &self.extractor
    }

    pub fn scratch(&self) -> &ScratchSpace {
        self.intake.scratch()
    }
}
