use anyhow::Context;
use tracing_subscriber::EnvFilter;

use edulingo_api::app::{app, AppState};
use edulingo_api::config::AppConfig;
use edulingo_api::database::{DatabaseManager, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("edulingo_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    if let Err(e) = config.validate() {
        tracing::error!("Configuration error: {}", e);
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Starting EduLingo API in {:?} mode", config.environment);

    let manager = match config.database.url {
        Some(_) => {
            let manager = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            manager.bootstrap().await.context("failed to bootstrap schema")?;
            Some(manager)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            None
        }
    };
    let store = manager.as_ref().map(DatabaseManager::store).unwrap_or_else(Store::memory);

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, store).context("failed to initialise application state")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("EduLingo API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(manager) = manager {
        manager.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
