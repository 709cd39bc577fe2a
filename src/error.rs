use thiserror::Error;

/// Substring that marks a domain error reported by the extraction tool.
///
/// pdftk reports a missing page or an unreadable document with
/// "Errors encountered. No output created." on stderr. Matching is
/// case-insensitive.
pub const TOOL_ERROR_MARKER: &str = "errors";

/// Errors raised while receiving a multipart upload.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The request carried no `pdf` file field (or was not multipart at all)
    #[error("No PDF file uploaded")]
    NoFileProvided,

    /// The file field declared a content type other than `application/pdf`
    #[error("Only PDF files are allowed")]
    UnsupportedMediaType { content_type: Option<String> },

    /// More than one `pdf` file field was sent
    #[error("Only one PDF file may be uploaded")]
    MultipleFiles,

    /// The upload exceeded the size ceiling
    #[error("File too large. Maximum size is {}MB.", .limit / (1024 * 1024))]
    PayloadTooLarge { limit: u64 },

    /// The multipart stream could not be parsed
    #[error("Malformed multipart upload: {0}")]
    Malformed(String),

    /// Writing the upload to scratch storage failed
    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

/// Errors produced by running the external extraction tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The process could not be started or awaited
    #[error("Failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    /// The process did not finish before the configured timeout
    #[error("{program} did not finish within {secs} seconds")]
    Timeout { program: String, secs: u64 },

    /// The process exited with a failure status
    #[error("Command failed ({status}): {output}")]
    Failed { status: String, output: String },

    /// The process exited successfully but left no output file behind
    #[error("Output file was not created. The PDF might not have a second page.")]
    MissingOutput,
}

impl ToolError {
    /// Whether the failure was caused by the uploaded document rather than
    /// by the tool or the host.
    pub fn is_input_rejection(&self) -> bool {
        match self {
            ToolError::Failed { output, .. } => contains_tool_error_marker(output),
            ToolError::MissingOutput => true,
            ToolError::Spawn { .. } | ToolError::Timeout { .. } => false,
        }
    }
}

/// Check tool output for [`TOOL_ERROR_MARKER`].
pub fn contains_tool_error_marker(output: &str) -> bool {
    output.to_ascii_lowercase().contains(TOOL_ERROR_MARKER)
}

/// Top-level error for the processing endpoint.
///
/// Every failure on the request path ends up here and is rendered as a JSON
/// body by the server layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Any other fault; the message is logged but never returned
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
