//! Main entry point for the healthwatch server binary

use anyhow::Result;
use healthwatch_core::{
    config::DatabaseConfig, create_app_with_config, get_database_pool, run_migrations, run_server,
    AppConfig, AppState, EndpointRegistry, EndpointRepository, HealthCheckOrchestrator,
    HttpProber, MemoryStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let registry = initialize_registry(&config.database).await;

    let prober = HttpProber::from_config(&config.probe)
        .map_err(|e| anyhow::anyhow!("Failed to build prober: {}", e))?;
    let orchestrator = HealthCheckOrchestrator::from_config(Arc::new(prober), &config.probe);

    info!(
        timeout_seconds = config.probe.timeout_seconds,
        max_redirects = config.probe.max_redirects,
        max_concurrency = config.probe.max_concurrency,
        "Health prober configured"
    );

    let state = AppState::new(registry, orchestrator).with_dashboard(config.dashboard.clone());

    info!("App: {} v{}", state.app_name, state.version);
    info!("Endpoint registry: {}", state.registry.backend());

    let app = create_app_with_config(state, &config);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn initialize_registry(config: &DatabaseConfig) -> Arc<dyn EndpointRegistry> {
    if config.is_in_memory() {
        info!("Using in-memory endpoint registry");
        return Arc::new(MemoryStore::new());
    }

    info!("Initializing database connection: {}", config.url);
    match initialize_database(config).await {
        Ok(repository) => {
            info!("Database initialized successfully");
            Arc::new(repository)
        }
        Err(e) => {
            warn!("Failed to initialize database, falling back to in-memory registry: {}", e);
            Arc::new(MemoryStore::new())
        }
    }
}

async fn initialize_database(config: &DatabaseConfig) -> Result<EndpointRepository> {
    let pool = get_database_pool(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;

    let history = run_migrations(pool.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {}", e))?;

    if let Some(latest) = history.last() {
        info!(
            version = latest.version,
            name = %latest.name,
            applied_at = %latest.applied_at,
            "Database schema is current"
        );
    }

    Ok(EndpointRepository::new(pool))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        };

        format!(
            "{}={level},healthwatch_core={level},tower_http=debug",
            env!("CARGO_CRATE_NAME").replace('-', "_"),
            level = default_level
        )
        .into()
    });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
