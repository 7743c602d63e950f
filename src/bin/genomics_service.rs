// ============================================================================
// Genomics Service
// ============================================================================
//
// Genes, variants and patient variant reports under /genoma (snake_case
// JSON). Patient existence and names come from the clinical service at
// CLINIC_SERVICE_URL.
//
// ============================================================================

use anyhow::{Context, Result};
use genosentinel::config::GenomicsConfig;
use genosentinel::genomics::clinic_client::ClinicClient;
use genosentinel::genomics::{self, GenomicsContext};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = GenomicsConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            config.logging.rust_log.clone(),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Genomics Service Starting ===");
    info!("Port: {}", config.port);
    info!("Storage: {:?}", config.storage);
    info!("Clinical service: {}", config.clinic_service_url);

    let store = genomics::build_store(&config)
        .await
        .context("Failed to initialize storage")?;
    let clinic = ClinicClient::new(config.clinic_service_url.clone(), config.clinic_timeout_secs)?;
    let app = genomics::create_router(GenomicsContext::new(store, Arc::new(clinic)));

    // Start server
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Failed to parse bind address")?;

    info!("Genomics Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(genosentinel::shutdown_signal())
        .await
        .context("Failed to start server")?;

    Ok(())
}
