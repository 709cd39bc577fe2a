//! Test utilities for integration tests.
//!
//! This module provides a scripted command executor that stands in for
//! pdftk, plus helpers for building multipart uploads and routers backed by
//! temporary scratch directories.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tempfile::TempDir;

use pdf_page_extractor::error::ToolError;
use pdf_page_extractor::pipeline::{
    CommandExecutor, CommandSpec, ExecOutput, Pipeline, ScratchSpace,
};
use pdf_page_extractor::{create_router, RouterConfig};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_USER: &str = "admin";
pub const TEST_PASS: &str = "s3cret:with:colons";

/// Bytes the mock tool writes as the extracted page.
pub const EXTRACTED_BYTES: &[u8] = b"%PDF-1.4\n% extracted page\n%%EOF\n";

/// A minimal document body; its contents are never parsed by the mock.
pub const SAMPLE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

// =============================================================================
// Mock Executor
// =============================================================================

/// What the mock tool does when invoked.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Write [`EXTRACTED_BYTES`] to the output path and exit 0
    WriteOutput,
    /// Exit 3 with pdftk's domain error on stderr
    DomainError,
    /// Exit 0 without writing anything
    NoOutput,
    /// Exit 1 with an unrelated message on stderr
    Crash(String),
    /// Sleep, then behave like `WriteOutput`
    Slow(Duration),
}

/// Executor that records invocations and replays a [`MockBehavior`].
#[derive(Clone)]
pub struct MockExecutor {
    behavior: MockBehavior,
    invocations: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<Vec<OsString>>>>,
}

impl MockExecutor {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            invocations: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Argument vectors of every call, in order.
    pub fn calls(&self) -> Vec<Vec<OsString>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(
        &self,
        command: &CommandSpec,
        _timeout: Duration,
    ) -> Result<ExecOutput, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(command.args.clone());

        if let MockBehavior::Slow(delay) = &self.behavior {
            tokio::time::sleep(*delay).await;
        }

        let output = match &self.behavior {
            MockBehavior::WriteOutput | MockBehavior::Slow(_) => {
                let output_path = PathBuf::from(&command.args[4]);
                tokio::fs::write(&output_path, EXTRACTED_BYTES)
                    .await
                    .unwrap();
                ExecOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                }
            }
            MockBehavior::DomainError => ExecOutput {
                success: false,
                code: Some(3),
                stderr: "Range Error: Nonexistent page.\nErrors encountered.  No output created."
                    .to_string(),
                ..Default::default()
            },
            MockBehavior::NoOutput => ExecOutput {
                success: true,
                code: Some(0),
                ..Default::default()
            },
            MockBehavior::Crash(message) => ExecOutput {
                success: false,
                code: Some(1),
                stderr: message.clone(),
                ..Default::default()
            },
        };

        Ok(output)
    }
}

// =============================================================================
// Router Helpers
// =============================================================================

/// A router wired to a mock executor and a fresh scratch space.
pub struct TestApp {
    pub router: Router,
    pub executor: MockExecutor,
    pub scratch: ScratchSpace,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new(behavior: MockBehavior) -> Self {
        Self::with_config(behavior, default_router_config(), None).await
    }

    pub async fn with_config(
        behavior: MockBehavior,
        config: RouterConfig,
        max_upload_size: Option<u64>,
    ) -> Self {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("uploads"), dir.path().join("output"));
        scratch.ensure().await.unwrap();

        let executor = MockExecutor::new(behavior);
        let mut pipeline = Pipeline::new(scratch.clone(), Arc::new(executor.clone()));
        if let Some(limit) = max_upload_size {
            pipeline = pipeline.with_max_upload_size(limit);
        }

        Self {
            router: create_router(pipeline, config),
            executor,
            scratch,
            _dir: dir,
        }
    }

    /// Whether both scratch directories are empty.
    pub fn scratch_is_empty(&self) -> bool {
        dir_is_empty(self.scratch.upload_dir()) && dir_is_empty(self.scratch.output_dir())
    }
}

pub fn default_router_config() -> RouterConfig {
    RouterConfig::new()
        .with_api_key(TEST_API_KEY)
        .with_basic_auth(TEST_USER, TEST_PASS)
        .with_tracing(false)
}

pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

// =============================================================================
// Request Helpers
// =============================================================================

pub const BOUNDARY: &str = "----pdf-page-extractor-test-boundary";

/// A part in a hand-built multipart body.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    /// A `pdf` file field with the given content type.
    pub fn pdf(content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: "pdf",
            filename: Some("document.pdf"),
            content_type: Some(content_type),
            data,
        }
    }

    /// A field without a filename carrying raw bytes.
    pub fn field(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            data,
        }
    }

    /// A plain text field.
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self::field(name, value.as_bytes())
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// `POST /process-pdf` with a valid bearer key and the given parts.
pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process-pdf")
        .header(header::AUTHORIZATION, format!("Bearer {}", TEST_API_KEY))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn basic_header(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", username, password))
    )
}

/// `GET` with valid basic-auth credentials.
pub fn basic_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, basic_header(TEST_USER, TEST_PASS))
        .body(Body::empty())
        .unwrap()
}
