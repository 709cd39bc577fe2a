//! # PDF Page Extractor
//!
//! An HTTP service that extracts one page from an uploaded PDF.
//!
//! A caller posts a PDF to `/process-pdf`; the service stores it in a scratch
//! directory, runs `pdftk <input> cat 2 output <output>`, and streams the
//! single-page result back as `processed.pdf`. Every temporary file is removed
//! once the request is done.
//!
//! ## Features
//!
//! - **Two auth schemes**: bearer key for processing, HTTP Basic for health and test pages
//! - **Streaming intake**: uploads are written to disk chunk by chunk with a 10 MiB ceiling
//! - **Pluggable tool execution**: pdftk runs behind the [`CommandExecutor`] trait
//! - **Guaranteed cleanup**: temporary files are owned by guards on every exit path
//! - **Bounded tool runtime**: a hung pdftk is killed after a configurable timeout
//!
//! ## Architecture
//!
//! - [`pipeline`] - Upload intake, pdftk jobs and result delivery
//! - [`server`] - Axum-based HTTP server, auth middleware and routes
//! - [`config`] - CLI and environment configuration
//! - [`error`] - Error types shared by the pipeline and the server
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pdf_page_extractor::{create_router, Pipeline, ProcessExecutor, RouterConfig, ScratchSpace};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let scratch = ScratchSpace::new("./uploads", "./output");
//!     scratch.ensure().await?;
//!
//!     let pipeline = Pipeline::new(scratch, Arc::new(ProcessExecutor));
//!     let config = RouterConfig::new()
//!         .with_api_key("my-api-key")
//!         .with_basic_auth("admin", "password");
//!
//!     let router = create_router(pipeline, config);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, IntakeError, ToolError};
pub use pipeline::{
    deliver, CommandExecutor, CommandSpec, ExecOutput, JobArtifacts, JobState, PageExtractor,
    Pipeline, ProcessExecutor, ProcessingJob, ScratchFile, ScratchSpace, TransferOutcome,
    UploadIntake, UploadedFile, DOWNLOAD_FILENAME, EXTRACTED_PAGE, MAX_UPLOAD_SIZE,
};
pub use server::{
    create_router, AppState, AuthError, BasicAuth, BearerAuth, ErrorResponse, HealthResponse,
    RouterConfig,
};
