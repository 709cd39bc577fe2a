//! Streaming the extracted page back to the caller.
//!
//! The response body owns the job's [`JobArtifacts`]. When the body stream
//! ends (or is dropped by the server) the artifacts are released:
//!
//! - the input file is always deleted;
//! - the output file is deleted only if every byte was handed to the
//!   transport. A read error or an early drop (client gone) leaves it in
//!   place.
//!
//! "Handed to the transport" is measured on the read side: once the whole
//! file has been read into the body, the transfer counts as completed even
//! if the client disconnects while the server still buffers the tail.
//!
//! Deletion failures are logged and otherwise ignored.

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use futures::Stream;
use http::{header, StatusCode};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::error::ApiError;

use super::intake::UploadedFile;
use super::scratch::ScratchFile;

/// Filename announced to the client, independent of the internal name.
pub const DOWNLOAD_FILENAME: &str = "processed.pdf";

/// How the outbound transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// All bytes were sent
    Completed,
    /// Reading the output file failed mid-stream
    Failed,
    /// The body was dropped before all bytes were sent
    Interrupted,
}

// =============================================================================
// Job Artifacts
// =============================================================================

/// The files of a succeeded job, awaiting delivery.
///
/// Dropping the artifacts without calling [`JobArtifacts::release`] deletes
/// both files.
#[derive(Debug)]
pub struct JobArtifacts {
    input: UploadedFile,
    output: ScratchFile,
}

impl JobArtifacts {
    pub(crate) fn new(input: UploadedFile, output: ScratchFile) -> Self {
        Self { input, output }
    }

    pub fn input_path(&self) -> &Path {
        self.input.path()
    }

    pub fn output_path(&self) -> &Path {
        self.output.path()
    }

    /// Delete the files according to how the transfer ended.
    pub fn release(mut self, outcome: TransferOutcome) {
        if outcome == TransferOutcome::Completed {
            debug!(output = %self.output.path().display(), "Transfer completed");
        } else {
            warn!(
                output = %self.output.path().display(),
                ?outcome,
                "Transfer did not complete, keeping output file"
            );
            self.output.retain();
        }
        // Dropping the fields performs the deletions.
    }
}

// =============================================================================
// Delivery Stream
// =============================================================================

/// Body stream over the output file that releases the artifacts once done.
struct DeliveryStream {
    inner: ReaderStream<File>,
    artifacts: Option<JobArtifacts>,
    expected: u64,
    /// Bytes read from the output file and handed to the body
    read: u64,
}

impl DeliveryStream {
    fn finish(&mut self, outcome: TransferOutcome) {
        if let Some(artifacts) = self.artifacts.take() {
            artifacts.release(outcome);
        }
    }
}

impl Stream for DeliveryStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.read += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finish(TransferOutcome::Failed);
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finish(TransferOutcome::Completed);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for DeliveryStream {
    fn drop(&mut self) {
        // The server may stop polling once Content-Length bytes went out.
        // Bytes still buffered in the transport count as delivered.
        let outcome = if self.read >= self.expected {
            TransferOutcome::Completed
        } else {
            TransferOutcome::Interrupted
        };
        self.finish(outcome);
    }
}

/// Build the download response for a succeeded job.
///
/// If the output cannot be opened, the artifacts are dropped (deleting both
/// files) and an internal error is returned.
pub async fn deliver(artifacts: JobArtifacts) -> Result<Response, ApiError> {
    let file = File::open(artifacts.output_path()).await?;
    let expected = file.metadata().await?.len();

    let stream = DeliveryStream {
        inner: ReaderStream::new(file),
        artifacts: Some(artifacts),
        expected,
        read: 0,
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, expected)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(response)
}
