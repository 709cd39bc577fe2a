//! Scratch directories and self-deleting temporary files.
//!
//! Every upload is written to the upload directory under a generated name of
//! the form `input-<millis>-<random>.pdf`. The file is created with
//! create-new semantics, so two concurrent jobs can never share a name: a
//! collision simply draws a new suffix. The matching output file reuses the
//! same suffix (`output-<millis>-<random>.pdf`) in the output directory.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tokio::fs::{File, OpenOptions};
use tracing::{debug, warn};

/// Default directory for incoming uploads.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Default directory for tool output.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Attempts at finding a free upload name before giving up.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Upper bound (exclusive) of the random part of a generated name.
const RANDOM_SUFFIX_RANGE: u32 = 1_000_000_000;

// =============================================================================
// Scratch Space
// =============================================================================

/// The pair of ephemeral directories used by the pipeline.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl ScratchSpace {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if they do not exist yet.
    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// Create a fresh, empty upload file with a unique name.
    ///
    /// Returns the guard owning the path together with an open handle.
    pub async fn create_upload(&self) -> io::Result<(ScratchFile, File, String)> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let suffix = unique_suffix();
            let path = self.upload_dir.join(format!("input-{suffix}.pdf"));

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((ScratchFile::new(path), file, suffix)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Upload name collision, retrying");
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // The directory vanished underneath us; recreate it once per attempt.
                    tokio::fs::create_dir_all(&self.upload_dir).await?;
                }
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "could not allocate a unique upload file name",
        ))
    }

    /// Output path paired with an upload suffix.
    pub fn output_path_for(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("output-{suffix}.pdf"))
    }
}

impl Default for ScratchSpace {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_DIR, DEFAULT_OUTPUT_DIR)
    }
}

/// Millisecond timestamp joined with a random number.
pub fn unique_suffix() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random: u32 = rand::thread_rng().gen_range(0..RANDOM_SUFFIX_RANGE);
    format!("{millis}-{random}")
}

// =============================================================================
// Scratch File
// =============================================================================

/// A path in scratch space that is deleted when the guard is dropped.
///
/// Call [`ScratchFile::retain`] to leave the file on disk instead.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    remove_on_drop: bool,
}

impl ScratchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            remove_on_drop: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file on disk when this guard is dropped.
    pub fn retain(&mut self) {
        self.remove_on_drop = false;
    }

    pub fn is_retained(&self) -> bool {
        !self.remove_on_drop
    }

    /// Delete the file now. Failures are logged, never returned.
    pub async fn remove(mut self) {
        self.remove_on_drop = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) => log_remove_failure(&self.path, &e),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.remove_on_drop {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) => log_remove_failure(&self.path, &e),
        }
    }
}

fn log_remove_failure(path: &Path, err: &io::Error) {
    // A file the tool never produced is not worth a warning.
    if err.kind() == io::ErrorKind::NotFound {
        return;
    }
    warn!(path = %path.display(), error = %err, "Failed to remove scratch file");
}
