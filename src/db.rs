//! PostgreSQL connection pooling and embedded migrations.

use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::time::Duration;

use crate::config::{DatabaseConfig, DbConnection};

/// Database connection pool type
pub type DbPool = Pool<Postgres>;

/// Create a PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
        .test_before_acquire(true);

    let pool = match &config.connection {
        DbConnection::Url(url) => options.connect(url).await,
        DbConnection::Parts {
            host,
            port,
            username,
            password,
            database,
        } => {
            let connect = PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(username)
                .password(password)
                .database(database);
            options.connect_with(connect).await
        }
    }
    .with_context(|| format!("Failed to connect to {}", config.describe()))?;

    Ok(pool)
}

/// Apply the clinical schema
pub async fn migrate_clinical(pool: &DbPool) -> Result<()> {
    let mut migrator = sqlx::migrate!("./migrations/clinical");
    // Both services may share one database; each ignores the other's versions
    migrator.set_ignore_missing(true);
    migrator
        .run(pool)
        .await
        .context("Failed to run clinical migrations")?;
    Ok(())
}

/// Apply the genomics schema
pub async fn migrate_genomics(pool: &DbPool) -> Result<()> {
    let mut migrator = sqlx::migrate!("./migrations/genomics");
    // Both services may share one database; each ignores the other's versions
    migrator.set_ignore_missing(true);
    migrator
        .run(pool)
        .await
        .context("Failed to run genomics migrations")?;
    Ok(())
}

/// Round-trip a trivial query; used by health checks
pub async fn ping(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Database ping failed")?;
    Ok(())
}

/// Current time at the precision `TIMESTAMPTZ` keeps (microseconds), so a
/// freshly created row and its reloaded copy carry the same timestamp.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
