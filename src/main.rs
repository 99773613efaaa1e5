//! Gatehouse server — multi-tenant authorization and account lifecycle.
//!
//! Entry point that wires all crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use gatehouse_api::{AppState, build_router};
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("GATEHOUSE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Gatehouse v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let db = gatehouse_database::DatabasePool::connect(&config.database).await?;
    db.health_check().await?;
    let pool = db.into_pool();

    gatehouse_database::migration::run_migrations(&pool).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_pool(pool, config)?;

    // Eager sweep at startup; expiry is otherwise checked lazily on read.
    state.sessions.delete_expired().await?;
    state.tokens.delete_expired().await?;

    let router = build_router(state);

    tracing::info!(addr = %bind_addr, "Listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {bind_addr}: {e}")))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {e}");
    }
}
