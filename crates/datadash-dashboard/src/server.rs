//! Dashboard server implementation.

use crate::error::DashboardError;
use crate::routes;
use crate::state::AppState;
use axum::Router;
use datadash_core::DashboardConfig;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// The dashboard served on its own listener.
pub struct DashboardServer {
    config: DashboardConfig,
    state: AppState,
}

impl DashboardServer {
    /// Create a new dashboard server with the given configuration.
    pub fn new(config: DashboardConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// The router with request tracing, nested under the configured base path.
    pub fn router(&self) -> Router {
        let dashboard = routes::create_router(self.state.clone());
        let app = match self.config.normalized_base_path() {
            "" => dashboard,
            base => Router::new().nest(base, dashboard),
        };
        app.layer(TraceLayer::new_for_http())
    }

    /// Serve until Ctrl-C.
    pub async fn run(&self) -> Result<(), DashboardError> {
        let addr = self.config.bind_address();
        tracing::info!(
            address = %addr,
            base_path = %self.config.normalized_base_path(),
            tables = self.state.tables().len(),
            "Starting datadash dashboard"
        );

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DashboardError::StartupFailed(e.to_string()))?;

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DashboardError::StartupFailed(e.to_string()))?;

        tracing::info!("Dashboard stopped");
        Ok(())
    }

    /// Get the configured listen port.
    pub fn listen_port(&self) -> u16 {
        self.config.port
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
