//! GenoSentinel backend: an authenticating API gateway in front of a
//! clinical-data service and a genomics service.
//!
//! Each service has its own binary under `src/bin/`; this library holds the
//! routers so tests can mount them on an ephemeral port.

pub mod auth;
pub mod clinical;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod genomics;
pub mod routes;
pub mod validation;

use tokio::signal;

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received. Shutting down...");
}
