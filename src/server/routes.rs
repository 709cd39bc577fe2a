//! Router configuration for the PDF processing API.
//!
//! This module defines the HTTP routes and applies the authentication,
//! body-limit, panic and tracing layers.
//!
//! # Route Structure
//!
//! ```text
//! POST /process-pdf   - Extract page 2 (bearer key)
//! GET  /health        - Health check (basic auth)
//! GET  /test          - Browser test page (basic auth)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pdf_page_extractor::pipeline::{Pipeline, ProcessExecutor, ScratchSpace};
//! use pdf_page_extractor::server::routes::{create_router, RouterConfig};
//!
//! let pipeline = Pipeline::new(ScratchSpace::default(), Arc::new(ProcessExecutor));
//! let config = RouterConfig::new()
//!     .with_api_key("my-api-key")
//!     .with_basic_auth("admin", "password");
//!
//! let router = create_router(pipeline, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::auth::{basic_auth_middleware, bearer_auth_middleware, BasicAuth, BearerAuth};
use super::handlers::{
    health_handler, not_found_handler, panic_response, process_pdf_handler, test_page_handler,
    AppState,
};
use crate::pipeline::Pipeline;

/// Room for multipart boundaries and part headers on top of the file size.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone, Default)]
pub struct RouterConfig {
    /// Expected bearer key for the processing endpoint
    pub api_key: Option<String>,

    /// Basic-auth username for health and test endpoints
    pub basic_username: Option<String>,

    /// Basic-auth password for health and test endpoints
    pub basic_password: Option<String>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a configuration with no secrets and tracing enabled.
    ///
    /// Without secrets every protected route answers 500.
    pub fn new() -> Self {
        Self {
            enable_tracing: true,
            ..Default::default()
        }
    }

    /// Set the bearer key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the basic-auth credentials.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.basic_username = Some(username.into());
        self.basic_password = Some(password.into());
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    fn bearer_auth(&self) -> BearerAuth {
        BearerAuth::new(self.api_key.clone())
    }

    fn basic_auth(&self) -> BasicAuth {
        BasicAuth::new(self.basic_username.clone(), self.basic_password.clone())
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("basic_username", &self.basic_username)
            .field(
                "basic_password",
                &self.basic_password.as_ref().map(|_| "<redacted>"),
            )
            .field("enable_tracing", &self.enable_tracing)
            .finish()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - The processing route behind the bearer-key guard
/// - Health and test routes behind the basic-auth guard
/// - A body limit sized for one maximum upload
/// - Panic recovery and a JSON 404 fallback
/// - Request tracing (optional)
pub fn create_router(pipeline: Pipeline, config: RouterConfig) -> Router {
    let body_limit = usize::try_from(pipeline.intake().max_size())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);
    let app_state = AppState::new(pipeline);

    // Auth layers are attached per route group, so each guard runs before
    // any handler (and before the upload body is read).
    let process_routes = Router::new()
        .route("/process-pdf", post(process_pdf_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            config.bearer_auth(),
            bearer_auth_middleware,
        ));

    let basic_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/test", get(test_page_handler))
        .layer(middleware::from_fn_with_state(
            config.basic_auth(),
            basic_auth_middleware,
        ));

    let router = Router::new()
        .merge(process_routes)
        .merge(basic_routes)
        .fallback(not_found_handler)
        .with_state(app_state)
        .layer(CatchPanicLayer::custom(panic_response));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
