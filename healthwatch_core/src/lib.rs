//! Core library for the endpoint health dashboard: registry, health engine and HTTP surface.

pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod registry;
pub mod store;
pub mod validation;

pub use crate::config::AppConfig;
pub use database::{get_database_pool, run_migrations, EndpointRepository};
pub use error::{AppError, Result};
pub use handlers::create_routes;
pub use health::{HealthCheckOrchestrator, HealthOutcome, HealthReport, HealthStatus, HttpProber, Probe};
pub use registry::EndpointRegistry;
pub use store::MemoryStore;

use axum::Router;
use crate::config::DashboardConfig;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub registry: Arc<dyn EndpointRegistry>,
    pub orchestrator: HealthCheckOrchestrator,
    pub dashboard: DashboardConfig,
}

impl AppState {
    pub fn new(registry: Arc<dyn EndpointRegistry>, orchestrator: HealthCheckOrchestrator) -> Self {
        Self {
            app_name: "Healthwatch".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            registry,
            orchestrator,
            dashboard: DashboardConfig::default(),
        }
    }

    pub fn with_dashboard(mut self, dashboard: DashboardConfig) -> Self {
        self.dashboard = dashboard;
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, &AppConfig::default())
}

pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Router {
    create_routes()
        .layer(middleware::cors_layer(&config.cors))
        .layer(middleware::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
