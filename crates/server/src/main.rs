//! HTTP entry point for the recommendation API.
//!
//! Configuration comes from `REEL_RECS_*` environment variables (see
//! `ServerConfig`), logging from `RUST_LOG`.

use anyhow::{Context, Result};
use tracing::info;

use server::{AppState, ModelHandle, ServerConfig, bootstrap, create_router, stop_training};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!("Starting reel-recs server with {:?}", config);

    let model = ModelHandle::empty();
    let training = bootstrap(&config, &model)
        .await
        .context("Failed to load the recommendation model")?;

    let app = create_router(AppState::new(model, config.model_path.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    info!("Server running on http://{}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    stop_training(training);

    info!("Application stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
