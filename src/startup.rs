//! Application startup and lifecycle management.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::error::AppError;
use crate::handlers::{health_check, sns_notification};
use crate::services::{HttpSignalGateway, SignalGateway};

/// Shared application state: read-only configuration and the gateway client.
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub gateway: Arc<dyn SignalGateway>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the real HTTP gateway client.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let gateway = HttpSignalGateway::new(config.signal.clone())
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
        Self::build_with_gateway(config, Arc::new(gateway)).await
    }

    /// Build the application with an injected gateway (used by tests).
    pub async fn build_with_gateway(
        config: RelayConfig,
        gateway: Arc<dyn SignalGateway>,
    ) -> Result<Self, AppError> {
        // port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("SNS relay listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState { config, gateway },
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = Router::new()
            .route("/sns", post(sns_notification))
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state);

        axum::serve(self.listener, router).await
    }
}
