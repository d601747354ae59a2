//! SQLite adapters for the session ledger and extraction record store.

pub mod connection;
pub mod migrations;
pub mod record_store;
pub mod session_repository;

pub use connection::{create_pool, create_test_pool, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use record_store::SqliteRecordStore;
pub use session_repository::SqliteSessionRepository;

use sqlx::SqlitePool;

/// Create the pool for a database path and bring the schema up to date.
pub async fn initialize_database(
    database_url: &str,
    config: Option<PoolConfig>,
) -> anyhow::Result<SqlitePool> {
    let pool = create_pool(database_url, config).await?;
    let migrator = Migrator::new(pool.clone());
    migrator
        .run_embedded_migrations(all_embedded_migrations())
        .await?;
    Ok(pool)
}
