// ============================================================================
// API Gateway
// ============================================================================
//
// Single entry point for GenoSentinel clients:
// - POST /auth/login issues an ADMIN bearer token for the configured account
// - every other path needs that token and is forwarded by prefix
//   (GATEWAY_ROUTES, first match wins)
//
// Upstream responses, errors included, are passed back unchanged.
//
// ============================================================================

use anyhow::{Context, Result};
use genosentinel::config::GatewayConfig;
use genosentinel::gateway::{create_router, GatewayState};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            config.logging.rust_log.clone(),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== API Gateway Starting ===");
    info!("Port: {}", config.port);
    for (prefix, host) in &config.routes {
        info!("Route: {} -> {}", prefix, host);
    }
    match config.upstream_timeout_secs {
        Some(secs) => info!("Upstream timeout: {}s", secs),
        None => info!("Upstream timeout: none"),
    }

    let state = GatewayState::from_config(&config).context("Failed to initialize gateway")?;
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Failed to parse bind address")?;

    info!("API Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(genosentinel::shutdown_signal())
        .await
        .context("Failed to start server")?;

    Ok(())
}
