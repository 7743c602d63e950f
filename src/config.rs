use anyhow::Result;
use std::str::FromStr;

mod clinical;
mod database;
mod gateway;
mod genomics;
mod logging;

pub use clinical::ClinicalConfig;
pub use database::{DatabaseConfig, DbConnection};
pub use gateway::{parse_routes, AuthConfig, GatewayConfig, JwtConfig};
pub use genomics::GenomicsConfig;
pub use logging::LoggingConfig;

// ============================================================================
// Configuration Constants
// ============================================================================

// Default port values
const DEFAULT_GATEWAY_PORT: u16 = 8080;
const DEFAULT_CLINICAL_PORT: u16 = 3000;
const DEFAULT_GENOMICS_PORT: u16 = 8000;

// Default token lifetime (in hours)
const DEFAULT_ACCESS_TOKEN_TTL_HOURS: i64 = 1;

// Default route table: first match wins, so order matters
const DEFAULT_GATEWAY_ROUTES: &str = "/clinica=http://localhost:3000,/genoma=http://localhost:8000";

const DEFAULT_CLINIC_SERVICE_URL: &str = "http://localhost:3000/clinica";
const DEFAULT_CLINIC_TIMEOUT_SECS: u64 = 10;

/// Upper bound for bodies the gateway buffers before forwarding (2 MB)
pub const MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Loads a `.env` file into the process environment if one is present.
///
/// Variables that are already set are not overridden.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Where a data service keeps its rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local maps; data is lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "in-memory" | "mem" => Ok(Self::Memory),
            _ => anyhow::bail!(
                "Invalid STORAGE_BACKEND: {}. Must be 'postgres' or 'memory'",
                s
            ),
        }
    }
}

impl StorageBackend {
    pub(crate) fn from_env() -> Result<Self> {
        std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()
    }
}

/// Reads a variable that must be present and non-blank.
pub(crate) fn required_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("{} must be set", key),
    }
}

/// Reads a variable, treating blank values as absent.
pub(crate) fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Reads and parses a variable, falling back to `default` when it is unset.
/// A value that is set but unparseable is a configuration error.
pub(crate) fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", key, raw, e)),
        None => Ok(default),
    }
}
