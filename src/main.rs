//! PDF Page Extractor - HTTP service returning page 2 of an uploaded PDF.
//!
//! This binary loads configuration, prepares the scratch directories and
//! starts the HTTP server.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_page_extractor::{
    config::Config,
    pipeline::{Pipeline, ProcessExecutor},
    server::create_router,
};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; variables may come from the real environment.
    let dotenv_path = dotenv::dotenv().ok();

    let config = Config::parse();
    init_logging(config.verbose);

    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    run_serve(config).await
}

// =============================================================================
// Serve
// =============================================================================

async fn run_serve(config: Config) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!(
        "PDF Page Extractor v{} starting",
        env!("CARGO_PKG_VERSION")
    );
    info!("Configuration:");
    info!("  Upload dir: {}", config.upload_dir.display());
    info!("  Output dir: {}", config.output_dir.display());
    info!("  pdftk: {}", config.pdftk_path);
    info!("  Tool timeout: {}s", config.tool_timeout_secs);

    for name in config.missing_secrets() {
        warn!("  {} is not set - the routes it protects will answer 500", name);
    }

    let scratch = config.scratch_space();
    if let Err(e) = scratch.ensure().await {
        error!("Failed to create scratch directories: {}", e);
        return ExitCode::FAILURE;
    }

    let pipeline = Pipeline::new(scratch, Arc::new(ProcessExecutor))
        .with_program(config.pdftk_path.clone())
        .with_timeout(config.tool_timeout());

    let router = create_router(pipeline, config.router_config());

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  PDF processing API server listening on: http://{}", addr);
    info!("");
    info!("  Health check:   GET  http://{}/health", addr);
    info!("  Process PDF:    POST http://{}/process-pdf", addr);
    info!("  Test interface: GET  http://{}/test", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Resolve when Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pdf_page_extractor=debug,tower_http=debug"
    } else {
        "pdf_page_extractor=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
