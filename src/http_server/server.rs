//! # HTTP Server
//!
//! Combines the service and student routers behind tracing and a
//! per-request timeout.

use std::future::Future;
use std::io;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::observability_routes::service_routes;
use super::student_routes::student_routes;
use crate::storage::SharedStorage;

/// HTTP server for the students API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server answering from `storage`
    pub fn new(config: HttpServerConfig, storage: SharedStorage) -> Self {
        let router = Self::build_router(&config, storage);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, storage: SharedStorage) -> Router {
        Router::new()
            .merge(service_routes())
            .merge(student_routes(storage))
            // Dropping a timed-out handler also drops its pending storage call
            .layer(TimeoutLayer::new(config.request_timeout()))
            .layer(TraceLayer::new_for_http())
    }

    /// Get the configured bind address
    pub fn address(&self) -> &str {
        &self.config.address
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until `shutdown` resolves, then drain open requests
    pub async fn serve<F>(self, shutdown: F) -> Result<(), io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.address.as_str()).await?;
        info!(address = %self.config.address, "server started");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// Resolves on SIGINT or SIGTERM (Ctrl-C elsewhere)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
