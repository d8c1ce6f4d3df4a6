//! # MultiAuth Server
//!
//! Serves the passcode registry over HTTP so a browser page can issue,
//! check and list one-time passcodes.

mod config;
mod routes;

pub use config::{AppConfig, ConfigError, ServerConfig, load_config, parse_config};
pub use routes::{ApiError, AppState, IssueRequest, RawCode, passcode_routes};

use axum::Router;
use multiauth_core::MultiAuthResult;
use multiauth_passcode::PasscodeRegistry;
use std::sync::Arc;

/// The passcode server.
pub struct PasscodeServer {
    /// Application configuration.
    pub config: AppConfig,
    registry: Arc<PasscodeRegistry>,
}

impl PasscodeServer {
    /// Creates a new server around an existing registry.
    pub fn new(config: AppConfig, registry: Arc<PasscodeRegistry>) -> Self {
        Self { config, registry }
    }

    /// Builds the HTTP router.
    pub fn router(&self) -> Router {
        passcode_routes(AppState {
            registry: Arc::clone(&self.registry),
            passcodes: self.config.passcodes.clone(),
        })
    }

    /// Starts the server and serves until Ctrl-C.
    pub async fn run(&self) -> MultiAuthResult<()> {
        let address = self.config.server.address();
        let listener = tokio::net::TcpListener::bind(&address).await?;

        tracing::info!("Starting MultiAuth passcode server on {}", address);
        tracing::info!(
            "Default passcode duration: {}ms",
            self.config.passcodes.default_duration_ms
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
