//! CLI command implementation
//!
//! Startup sequence:
//! 1. Configuration load
//! 2. Logging
//! 3. Storage construction (any failure aborts before binding)
//! 4. HTTP serving until SIGINT/SIGTERM
//! 5. Graceful drain, bounded by [`SHUTDOWN_TIMEOUT`]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{error, info};

use crate::config::Config;
use crate::http_server::{shutdown_signal, HttpServer};
use crate::observability;
use crate::storage;

use super::args::Cli;
use super::errors::{CliError, CliResult};

/// How long open requests may take to finish after a shutdown signal
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Main CLI entry point
///
/// Parses arguments and runs the server. This is the only function that
/// main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config_path = cli
        .config
        .ok_or_else(|| CliError::config_error("Config path not set"))?;

    serve(&config_path)
}

/// Load the config at `config_path` and serve until a shutdown signal
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    observability::init(&config.env);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(run_server(config))
}

async fn run_server(config: Config) -> CliResult<()> {
    let storage = storage::new(&config.db).await.map_err(|e| {
        error!(error = %e, "storage initialisation failed");
        CliError::from(e)
    })?;

    info!(
        env = %config.env,
        version = env!("CARGO_PKG_VERSION"),
        connected_db = %config.db.connected_db(),
        "storage initialised"
    );

    let server = HttpServer::new(config.http_server, storage);

    let shutdown = Arc::new(Notify::new());
    let trigger = Arc::clone(&shutdown);
    let mut serving = tokio::spawn(server.serve(async move { trigger.notified().await }));

    tokio::select! {
        joined = &mut serving => {
            // Stopped without being asked to: bind failure or accept loop error
            return match joined {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(CliError::serve_failed(format!("Server failed to start {}", e))),
                Err(e) => Err(CliError::serve_failed(format!("server task failed: {}", e))),
            };
        }
        _ = shutdown_signal() => {}
    }

    info!("shutting down the server");
    shutdown.notify_one();

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, serving).await {
        Ok(Ok(Ok(()))) => {
            info!("server shutdown successfully");
            Ok(())
        }
        Ok(Ok(Err(e))) => {
            error!(error = %e, "failed to shutdown server");
            Err(CliError::serve_failed(e.to_string()))
        }
        Ok(Err(e)) => {
            error!(error = %e, "failed to shutdown server");
            Err(CliError::serve_failed(e.to_string()))
        }
        Err(_) => {
            error!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "failed to shutdown server: drain timed out"
            );
            Err(CliError::serve_failed("graceful shutdown timed out"))
        }
    }
}
