//! HTTP server layer for the PDF page extractor.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   POST /process-pdf        GET /health        GET /test         │
//! │                                                                 │
//! │  ┌─────────────┐  ┌──────────────────┐  ┌───────────────────┐   │
//! │  │  handlers   │  │      auth        │  │      routes       │   │
//! │  │ (requests)  │  │ (bearer / basic) │  │ (router config)   │   │
//! │  └─────────────┘  └──────────────────┘  └───────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod test_page;

pub use auth::{
    basic_auth_middleware, bearer_auth_middleware, AuthError, BasicAuth, BearerAuth, BASIC_REALM,
};
pub use handlers::{
    health_handler, process_pdf_handler, test_page_handler, AppState, ErrorResponse,
    HealthResponse,
};
pub use routes::{create_router, RouterConfig};
