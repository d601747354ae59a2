//! Shared wiring for CLI commands.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::sqlite::{initialize_database, PoolConfig, SqliteSessionRepository};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Loaded configuration plus the database handles every command needs.
pub struct CliContext {
    pub config: Config,
    pub pool: SqlitePool,
    pub sessions: Arc<SqliteSessionRepository>,
}

impl CliContext {
    pub async fn init() -> Result<Self> {
        let config = ConfigLoader::load()?;

        let database_url = format!("sqlite://{}", config.database.path);
        let pool_config = PoolConfig {
            max_connections: config.database.max_connections,
            ..PoolConfig::default()
        };
        let pool = initialize_database(&database_url, Some(pool_config))
            .await
            .context("Failed to open database; run `resume-ingest init` first")?;

        let sessions = Arc::new(SqliteSessionRepository::new(pool.clone()));

        Ok(Self {
            config,
            pool,
            sessions,
        })
    }
}
