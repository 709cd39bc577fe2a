//! HTTP request handlers for the PDF processing API.
//!
//! # Endpoints
//!
//! - `POST /process-pdf` - Extract page 2 of an uploaded PDF
//! - `GET /health` - Health check endpoint
//! - `GET /test` - Browser test page

use std::any::Any;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{ApiError, IntakeError, ToolError};
use crate::pipeline::{deliver, Pipeline};

use super::test_page::render_test_page;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the processing pipeline.
///
/// This is passed to all handlers via Axum's State extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Short, caller-safe description of the failure
    pub error: String,

    /// Underlying tool message, when it is safe to show
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ApiError to HTTP response.
///
/// - 4xx errors are logged at WARN level (client errors)
/// - 5xx errors are logged at ERROR level (server errors)
///
/// Internal details (I/O errors, spawn failures) are logged but never
/// returned to the caller.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Intake(err) => match err {
                IntakeError::NoFileProvided
                | IntakeError::UnsupportedMediaType { .. }
                | IntakeError::MultipleFiles
                | IntakeError::PayloadTooLarge { .. } => {
                    (StatusCode::BAD_REQUEST, ErrorResponse::new(err.to_string()))
                }
                IntakeError::Malformed(_) => (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Malformed multipart upload"),
                ),
                IntakeError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                ),
            },

            ApiError::Tool(err) if err.is_input_rejection() => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details(
                    "PDF processing failed. The PDF might not have a second page or might be corrupted.",
                    tool_details(err),
                ),
            ),
            ApiError::Tool(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details("Failed to process PDF with pdftk", tool_details(err)),
            ),

            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Internal server error"),
            ),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "Server error: {}", self);
        } else {
            warn!(status = status.as_u16(), "Client error: {}", self);
        }

        (status, Json(body)).into_response()
    }
}

/// Tool message shown to the caller. Spawn failures expose host details and
/// are reduced to a generic message.
fn tool_details(err: &ToolError) -> String {
    match err {
        ToolError::Failed { output, .. } if !output.is_empty() => output.clone(),
        ToolError::Spawn { program, .. } => format!("{} could not be started", program),
        other => other.to_string(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle PDF processing requests.
///
/// # Endpoint
///
/// `POST /process-pdf`
///
/// # Request
///
/// `multipart/form-data` with a `pdf` field holding one `application/pdf`
/// file of at most 10 MiB.
///
/// # Response
///
/// - `200 OK`: the extracted page, `Content-Disposition: attachment; filename="processed.pdf"`
/// - `400 Bad Request`: no file, wrong type, too large, or the PDF has no second page
/// - `401 Unauthorized` / `403 Forbidden`: bearer key missing or wrong
/// - `500 Internal Server Error`: pdftk failed or the server is misconfigured
pub async fn process_pdf_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let multipart = multipart.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Request is not a multipart upload");
        IntakeError::NoFileProvided
    })?;

    let upload = state.pipeline.intake().receive(multipart).await?;
    let artifacts = state.pipeline.extractor().process(upload).await?;

    deliver(artifacts).await
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "OK",
///   "message": "PDF processing API is running"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "PDF processing API is running".to_string(),
    })
}

/// Serve the browser test page.
pub async fn test_page_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_test_page(state.pipeline.intake().max_size()))
}

/// JSON 404 for unknown routes.
pub async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found"))).into_response()
}

/// Turn a handler panic into a JSON 500.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error")),
    )
        .into_response()
}

// =============================================================================
// Tests
// =============================================================================
