//! Multipart upload intake.
//!
//! Reads the `pdf` field of a multipart body, checks its declared content
//! type, and streams it into the upload directory while enforcing the size
//! ceiling. A rejected or interrupted upload never leaves a file behind: the
//! partially written file is owned by a [`ScratchFile`] guard until intake
//! succeeds.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use http::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::IntakeError;

use super::scratch::{ScratchFile, ScratchSpace};

/// Name of the multipart field holding the document.
pub const UPLOAD_FIELD: &str = "pdf";

/// The only accepted media type.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Maximum accepted upload size (10 MiB).
pub const MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

// =============================================================================
// Uploaded File
// =============================================================================

/// A validated upload persisted in scratch space.
///
/// Dropping it deletes the file.
#[derive(Debug)]
pub struct UploadedFile {
    file: ScratchFile,
    suffix: String,
    content_type: String,
    size: u64,
}

impl UploadedFile {
    pub(crate) fn new(
        file: ScratchFile,
        suffix: String,
        content_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            file,
            suffix,
            content_type: content_type.into(),
            size,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }

    /// The unique part of the generated name, shared with the output file.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Content type as declared by the client.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Delete the upload now.
    pub async fn remove(self) {
        self.file.remove().await;
    }
}

// =============================================================================
// Upload Intake
// =============================================================================

/// Validates and stores uploads.
#[derive(Debug, Clone)]
pub struct UploadIntake {
    scratch: ScratchSpace,
    max_size: u64,
}

impl UploadIntake {
    pub fn new(scratch: ScratchSpace) -> Self {
        Self {
            scratch,
            max_size: MAX_UPLOAD_SIZE,
        }
    }

    /// Override the size ceiling.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    /// Receive the `pdf` field of a multipart body.
    ///
    /// Fields with other names are skipped. The whole body is read, and a
    /// second `pdf` field rejects the upload.
    pub async fn receive(&self, mut multipart: Multipart) -> Result<UploadedFile, IntakeError> {
        let mut upload: Option<UploadedFile> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| self.multipart_error(e))?
        {
            if field.name() != Some(UPLOAD_FIELD) {
                debug!(field = ?field.name(), "Skipping unrelated multipart field");
                continue;
            }

            if upload.is_some() {
                // Dropping the stored upload deletes it.
                return Err(IntakeError::MultipleFiles);
            }
            upload = Some(self.store(field).await?);
        }

        upload.ok_or(IntakeError::NoFileProvided)
    }

    async fn store(&self, mut field: Field<'_>) -> Result<UploadedFile, IntakeError> {
        let content_type = match field.content_type() {
            Some(ct) if is_pdf_media_type(Some(ct)) => ct.to_owned(),
            other => {
                return Err(IntakeError::UnsupportedMediaType {
                    content_type: other.map(str::to_owned),
                })
            }
        };

        let (file, mut handle, suffix) = self.scratch.create_upload().await?;
        let mut size: u64 = 0;

        while let Some(chunk) = field.chunk().await.map_err(|e| self.multipart_error(e))? {
            size += chunk.len() as u64;
            if size > self.max_size {
                warn!(
                    path = %file.path().display(),
                    max_size = self.max_size,
                    "Upload exceeds size limit, discarding"
                );
                return Err(IntakeError::PayloadTooLarge {
                    limit: self.max_size,
                });
            }
            handle.write_all(&chunk).await?;
        }
        handle.flush().await?;
        drop(handle);

        info!(path = %file.path().display(), size, "Stored upload");

        Ok(UploadedFile::new(file, suffix, content_type, size))
    }

    fn multipart_error(&self, err: MultipartError) -> IntakeError {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            IntakeError::PayloadTooLarge {
                limit: self.max_size,
            }
        } else {
            IntakeError::Malformed(err.body_text())
        }
    }
}

/// Compare the essence of a content type (parameters ignored) with
/// `application/pdf`.
fn is_pdf_media_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
        .unwrap_or(false)
}
