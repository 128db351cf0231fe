use anyhow::{Context, Result};
use smartmall::api::{create_router, AppState};
use smartmall::config::{env::config_path, load_or_default};
use smartmall::hub::MallHub;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartmall=info".into()),
        )
        .init();

    info!("Smart Mall hub starting...");

    let path = config_path();
    let config = load_or_default(&path)?;
    info!(
        config = %path,
        bind_addr = %config.hub.bind_addr,
        upload_dir = %config.hub.upload_dir,
        slots = config.hub.parking.len(),
        "Configuration loaded"
    );

    tokio::fs::create_dir_all(&config.hub.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", config.hub.upload_dir))?;

    let hub = Arc::new(MallHub::from_config(&config.hub));
    let router = create_router(AppState::new(hub, &config.hub));

    let listener = tokio::net::TcpListener::bind(&config.hub.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.hub.bind_addr))?;
    info!(addr = %config.hub.bind_addr, "Hub listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("Hub server error")?;

    info!("Smart Mall hub stopped");
    Ok(())
}
