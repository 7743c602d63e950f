// ============================================================================
// Clinical Data Service
// ============================================================================
//
// Patients, tumor types and clinical records under /clinica (camelCase JSON).
// Reached through the gateway; the genomics service also calls it directly
// to look up patients.
//
// ============================================================================

use anyhow::{Context, Result};
use genosentinel::clinical::{self, ClinicalContext};
use genosentinel::config::ClinicalConfig;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ClinicalConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            config.logging.rust_log.clone(),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Clinical Data Service Starting ===");
    info!("Port: {}", config.port);
    info!("Storage: {:?}", config.storage);

    let store = clinical::build_store(&config)
        .await
        .context("Failed to initialize storage")?;
    let app = clinical::create_router(ClinicalContext::new(store));

    // Start server
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Failed to parse bind address")?;

    info!("Clinical Data Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(genosentinel::shutdown_signal())
        .await
        .context("Failed to start server")?;

    Ok(())
}
