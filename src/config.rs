//! Configuration management for the PDF page extractor.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables (optionally loaded from a `.env` file)
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use pdf_page_extractor::config::Config;
//!
//! // Parse from command line and environment
//! let config = Config::parse();
//!
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 3000)
//! - `API_KEY` - Bearer key for `POST /process-pdf`
//! - `BASIC_AUTH_USERNAME` / `BASIC_AUTH_PASSWORD` - Credentials for `/health` and `/test`
//! - `UPLOAD_DIR` - Scratch directory for uploads (default: ./uploads)
//! - `OUTPUT_DIR` - Scratch directory for tool output (default: ./output)
//! - `PDFTK_PATH` - pdftk executable (default: pdftk)
//! - `TOOL_TIMEOUT_SECS` - Time limit for one pdftk run (default: 60)
//!
//! Missing secrets do not stop the server: the affected routes answer
//! `500` until they are configured.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::pipeline::{
    ScratchSpace, DEFAULT_OUTPUT_DIR, DEFAULT_PDFTK_PATH, DEFAULT_TOOL_TIMEOUT, DEFAULT_UPLOAD_DIR,
};
use crate::server::RouterConfig;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// PDF Page Extractor - returns page 2 of an uploaded PDF.
///
/// Accepts a PDF upload over HTTP, runs pdftk against it and streams the
/// single-page result back to the caller.
#[derive(Parser, Debug, Clone)]
#[command(name = "pdf-page-extractor")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Bearer key required by the processing endpoint.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Username for the health and test endpoints.
    #[arg(long, env = "BASIC_AUTH_USERNAME")]
    pub basic_auth_username: Option<String>,

    /// Password for the health and test endpoints.
    #[arg(long, env = "BASIC_AUTH_PASSWORD", hide_env_values = true)]
    pub basic_auth_password: Option<String>,

    // =========================================================================
    // Processing Configuration
    // =========================================================================
    /// Directory for incoming uploads (created if missing).
    #[arg(long, default_value = DEFAULT_UPLOAD_DIR, env = "UPLOAD_DIR")]
    pub upload_dir: PathBuf,

    /// Directory for pdftk output (created if missing).
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR, env = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// pdftk executable name or path.
    #[arg(long, default_value = DEFAULT_PDFTK_PATH, env = "PDFTK_PATH")]
    pub pdftk_path: String,

    /// Seconds a single pdftk run may take before it is killed.
    #[arg(long, default_value_t = DEFAULT_TOOL_TIMEOUT.as_secs(), env = "TOOL_TIMEOUT_SECS")]
    pub tool_timeout_secs: u64,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tool_timeout_secs == 0 {
            return Err("tool_timeout_secs must be greater than 0".to_string());
        }

        if self.pdftk_path.trim().is_empty() {
            return Err("pdftk path must not be empty. Set --pdftk-path or PDFTK_PATH".to_string());
        }

        if self.upload_dir == self.output_dir {
            return Err("upload_dir and output_dir must be different directories".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn scratch_space(&self) -> ScratchSpace {
        ScratchSpace::new(&self.upload_dir, &self.output_dir)
    }

    /// Secrets that are not set, by environment variable name.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_unset(&self.api_key) {
            missing.push("API_KEY");
        }
        if is_unset(&self.basic_auth_username) {
            missing.push("BASIC_AUTH_USERNAME");
        }
        if is_unset(&self.basic_auth_password) {
            missing.push("BASIC_AUTH_PASSWORD");
        }
        missing
    }

    /// Build the router configuration from this config.
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            api_key: self.api_key.clone(),
            basic_username: self.basic_auth_username.clone(),
            basic_password: self.basic_auth_password.clone(),
            enable_tracing: !self.no_tracing,
        }
    }
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

// =============================================================================
// Tests
// =============================================================================
