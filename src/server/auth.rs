//! Request authentication.
//!
//! Two independent schemes guard two sets of routes:
//!
//! - **Bearer key** on `POST /process-pdf`:
//!   ```text
//!   Authorization: Bearer <API_KEY>
//!   ```
//! - **Basic auth** on `GET /health` and `GET /test`:
//!   ```text
//!   Authorization: Basic base64(<username>:<password>)
//!   ```
//!
//! Both guards run as Axum middleware, so a rejected request never reaches a
//! handler and its body is never read.
//!
//! # Security Properties
//!
//! - **Constant-time comparison**: secrets are compared with `subtle` so the
//!   comparison time does not depend on where the first mismatch is.
//! - **Missing configuration fails closed**: an unset secret rejects every
//!   request with a 500 instead of allowing access.
//!
//! # Example
//!
//! ```rust
//! use pdf_page_extractor::server::auth::BearerAuth;
//!
//! let auth = BearerAuth::new(Some("my-api-key".to_string()));
//! assert!(auth.verify(Some("Bearer my-api-key")).is_ok());
//! assert!(auth.verify(Some("Bearer wrong")).is_err());
//! ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};

use super::handlers::ErrorResponse;

/// Realm announced in `WWW-Authenticate` challenges.
pub const BASIC_REALM: &str = "PDF Processor";

const BEARER_PREFIX: &str = "Bearer ";
const BASIC_PREFIX: &str = "Basic ";

// =============================================================================
// Types
// =============================================================================

/// Authentication error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The expected bearer key is not configured
    ApiKeyNotConfigured,

    /// The expected basic-auth credentials are not configured
    BasicCredentialsNotConfigured,

    /// Bearer header is missing or does not start with `Bearer `
    MissingOrMalformedHeader,

    /// Bearer key does not match
    InvalidApiKey,

    /// Basic header is missing or does not start with `Basic `
    AuthenticationRequired,

    /// Basic credentials could not be decoded or do not match
    InvalidCredentials,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::ApiKeyNotConfigured => {
                write!(f, "Server configuration error: API_KEY not set")
            }
            AuthError::BasicCredentialsNotConfigured => write!(
                f,
                "Server configuration error: Basic auth credentials not set"
            ),
            AuthError::MissingOrMalformedHeader => write!(
                f,
                "Missing or invalid Authorization header. Expected: Bearer <API_KEY>"
            ),
            AuthError::InvalidApiKey => write!(f, "Invalid API key"),
            AuthError::AuthenticationRequired => write!(f, "Authentication required"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
        }
    }
}

impl AuthError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::ApiKeyNotConfigured | AuthError::BasicCredentialsNotConfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::MissingOrMalformedHeader
            | AuthError::AuthenticationRequired
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidApiKey => StatusCode::FORBIDDEN,
        }
    }

    /// Whether the response must carry a Basic challenge.
    fn needs_challenge(&self) -> bool {
        matches!(
            self,
            AuthError::AuthenticationRequired | AuthError::InvalidCredentials
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        // Misconfiguration is an operator problem, wrong keys may be probing.
        match &self {
            AuthError::ApiKeyNotConfigured | AuthError::BasicCredentialsNotConfigured => {
                error!(status = status.as_u16(), "Authentication failed: {}", message);
            }
            AuthError::InvalidApiKey | AuthError::InvalidCredentials => {
                warn!(status = status.as_u16(), "Authentication failed: {}", message);
            }
            _ => {
                debug!(status = status.as_u16(), "Authentication failed: {}", message);
            }
        }

        let mut response = (status, Json(ErrorResponse::new(message))).into_response();
        if self.needs_challenge() {
            let challenge = format!("Basic realm=\"{}\"", BASIC_REALM);
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

// =============================================================================
// Bearer Key
// =============================================================================

/// Shared-secret bearer authentication.
#[derive(Clone, Default)]
pub struct BearerAuth {
    api_key: Option<String>,
}

impl BearerAuth {
    /// Create an authenticator. `None` or an empty key means "not configured".
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Check the raw `Authorization` header value.
    pub fn verify(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let expected = self
            .api_key
            .as_deref()
            .ok_or(AuthError::ApiKeyNotConfigured)?;

        let provided = authorization
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthError::MissingOrMalformedHeader)?;

        if constant_time_eq(provided, expected) {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth")
            .field("configured", &self.is_configured())
            .finish()
    }
}

// =============================================================================
// Basic Auth
// =============================================================================

/// Single-user HTTP Basic authentication.
#[derive(Clone, Default)]
pub struct BasicAuth {
    credentials: Option<(String, String)>,
}

impl BasicAuth {
    /// Create an authenticator. Both values must be present and non-empty,
    /// otherwise the authenticator is "not configured".
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        let credentials = match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        };
        Self { credentials }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Check the raw `Authorization` header value.
    ///
    /// The decoded payload is split at the first `:`, so passwords may
    /// contain colons.
    pub fn verify(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let (expected_user, expected_pass) = self
            .credentials
            .as_ref()
            .ok_or(AuthError::BasicCredentialsNotConfigured)?;

        let encoded = authorization
            .and_then(|value| value.strip_prefix(BASIC_PREFIX))
            .ok_or(AuthError::AuthenticationRequired)?;

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::InvalidCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidCredentials)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::InvalidCredentials)?;

        // Evaluate both comparisons to avoid leaking which one failed.
        let user_ok = constant_time_eq(username, expected_user);
        let pass_ok = constant_time_eq(password, expected_pass);

        if user_ok & pass_ok {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("configured", &self.is_configured())
            .finish()
    }
}

// =============================================================================
// Axum Middleware
// =============================================================================

fn authorization_header(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Axum middleware enforcing the bearer key.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware, routing::post};
/// use pdf_page_extractor::server::auth::{BearerAuth, bearer_auth_middleware};
///
/// let auth = BearerAuth::new(Some("secret-key".to_string()));
/// let app = Router::new()
///     .route("/process-pdf", post(process_pdf_handler))
///     .layer(middleware::from_fn_with_state(auth, bearer_auth_middleware));
/// ```
pub async fn bearer_auth_middleware(
    State(auth): State<BearerAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    auth.verify(authorization_header(&request))?;
    Ok(next.run(request).await)
}

/// Axum middleware enforcing Basic credentials.
pub async fn basic_auth_middleware(
    State(auth): State<BasicAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    auth.verify(authorization_header(&request))?;
    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
