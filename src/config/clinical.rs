// ============================================================================
// Clinical Service Configuration
// ============================================================================

use anyhow::Result;

use super::{parse_env_or, DatabaseConfig, LoggingConfig, StorageBackend, DEFAULT_CLINICAL_PORT};

#[derive(Clone, Debug)]
pub struct ClinicalConfig {
    pub port: u16,
    pub storage: StorageBackend,
    /// Present only for the Postgres backend
    pub database: Option<DatabaseConfig>,
    pub logging: LoggingConfig,
}

impl ClinicalConfig {
    pub fn from_env() -> Result<Self> {
        super::load_dotenv();

        let storage = StorageBackend::from_env()?;
        let database = match storage {
            StorageBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            port: parse_env_or("PORT", DEFAULT_CLINICAL_PORT)?,
            storage,
            database,
            logging: LoggingConfig::from_env(),
        })
    }
}
