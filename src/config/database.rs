// ============================================================================
// Database Configuration
// ============================================================================

use anyhow::Result;

use super::{optional_env, parse_env_or, required_env};

/// How to reach PostgreSQL.
#[derive(Clone, Debug)]
pub enum DbConnection {
    /// A full `postgres://` URL (DATABASE_URL)
    Url(String),
    /// Discrete settings (DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_NAME)
    Parts {
        host: String,
        port: u16,
        username: String,
        password: String,
        database: String,
    },
}

/// Database connection and pool configuration
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub connection: DbConnection,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Timeout for acquiring a connection from the pool (seconds)
    pub acquire_timeout_secs: u64,
    /// Timeout for idle connections before they are closed (seconds)
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let connection = match optional_env("DATABASE_URL") {
            Some(url) => DbConnection::Url(url),
            None => DbConnection::Parts {
                host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: parse_env_or("DB_PORT", 5432)?,
                username: required_env("DB_USER")?,
                password: std::env::var("DB_PASSWORD").unwrap_or_default(),
                database: required_env("DB_NAME")?,
            },
        };

        Ok(Self {
            connection,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            acquire_timeout_secs: std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
        })
    }

    /// Connection target without the password, for startup logs
    pub fn describe(&self) -> String {
        match &self.connection {
            DbConnection::Url(url) => match (url.find("://"), url.rfind('@')) {
                (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
                    format!("{}***{}", &url[..scheme_end + 3], &url[at_pos..])
                }
                _ => url.clone(),
            },
            DbConnection::Parts {
                host,
                port,
                username,
                database,
                ..
            } => format!("postgres://{}:***@{}:{}/{}", username, host, port, database),
        }
    }
}
