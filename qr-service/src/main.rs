use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use qr_service::{
    build_router,
    config::Config,
    middleware::cors::cors_layer,
    observability::{init_logging, LogConfig},
    qr::{QrEncoder, QrSettings},
    service::QrIssuer,
    storage::{ObjectStore, S3Storage},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_logging(LogConfig {
        level: config.log_level,
        format: config.log_format,
    })?;

    config.validate()?;
    info!(?config, "Configuration loaded");

    // One client for the life of the process
    let storage = S3Storage::connect(&config.storage).await;
    info!(bucket = %storage.bucket(), "S3 client initialized");

    let issuer = QrIssuer::new(
        QrEncoder::new(QrSettings::from(&config.qr)),
        Arc::new(storage),
        config.storage.key_prefix.clone(),
        Duration::from_secs(config.storage.presign_expiry_secs),
    );

    let state = AppState {
        issuer: Arc::new(issuer),
    };

    let cors = cors_layer(&config.cors.allowed_origins)?;
    let app = build_router(state, cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(%addr, "QR service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("QR service shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
