// ============================================================================
// Genomics Service Configuration
// ============================================================================

use anyhow::Result;

use super::{
    parse_env_or, DatabaseConfig, LoggingConfig, StorageBackend, DEFAULT_CLINIC_SERVICE_URL,
    DEFAULT_CLINIC_TIMEOUT_SECS, DEFAULT_GENOMICS_PORT,
};

#[derive(Clone, Debug)]
pub struct GenomicsConfig {
    pub port: u16,
    pub storage: StorageBackend,
    /// Present only for the Postgres backend
    pub database: Option<DatabaseConfig>,
    /// Base URL of the clinical service including its path prefix,
    /// e.g. "http://localhost:3000/clinica"
    pub clinic_service_url: String,
    pub clinic_timeout_secs: u64,
    pub logging: LoggingConfig,
}

impl GenomicsConfig {
    pub fn from_env() -> Result<Self> {
        super::load_dotenv();

        let storage = StorageBackend::from_env()?;
        let database = match storage {
            StorageBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            port: parse_env_or("PORT", DEFAULT_GENOMICS_PORT)?,
            storage,
            database,
            clinic_service_url: std::env::var("CLINIC_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_CLINIC_SERVICE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            clinic_timeout_secs: parse_env_or("CLINIC_TIMEOUT_SECS", DEFAULT_CLINIC_TIMEOUT_SECS)?,
            logging: LoggingConfig::from_env(),
        })
    }
}
