//! NHIS Claims Portal - API Server Binary
//!
//! This binary starts the HTTP API server for the claims portal core.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin nhis-api
//!
//! # Run with environment variables
//! NHIS_HOST=0.0.0.0 NHIS_PORT=8080 cargo run --bin nhis-api
//! ```
//!
//! # Environment Variables
//!
//! * `NHIS_HOST` - Server host (default: 0.0.0.0)
//! * `NHIS_PORT` - Server port (default: 8080)
//! * `NHIS_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `NHIS_TIMEZONE` - IANA timezone of the portal (default: Africa/Lagos)
//! * `NHIS_CURRENCY` - ISO 4217 scheme currency (default: NGN)
//! * `NHIS_AUDIT_CONFIG` - Path to a JSON file overriding audit thresholds

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::Currency;
use interface_api::{config::ApiConfig, create_router};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the configured address.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    // Load configuration from environment
    let config = load_config();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        currency = %config.currency,
        "Starting NHIS Claims Portal API Server"
    );

    // Create the API router
    let app = create_router(config.clone());

    // Parse server address
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("Invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Falls back to individual variables, then defaults, if the prefixed
/// environment source cannot be read.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| {
        let defaults = ApiConfig::default();
        ApiConfig {
            host: std::env::var("NHIS_HOST").unwrap_or(defaults.host),
            port: std::env::var("NHIS_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("NHIS_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            timezone: std::env::var("NHIS_TIMEZONE").unwrap_or(defaults.timezone),
            currency: std::env::var("NHIS_CURRENCY")
                .ok()
                .and_then(|c| c.parse::<Currency>().ok())
                .unwrap_or(defaults.currency),
            audit_config_path: std::env::var("NHIS_AUDIT_CONFIG").ok(),
        }
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
