//! Database module
//!
//! Pool setup, embedded migrations and the repositories built on them.

pub mod connection;
pub mod repositories;

use sqlx::{PgPool, migrate::Migrator};

use crate::config::DatabaseConfig;

pub use connection::*;

/// Schema migrations embedded at build time
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Connect and bring the schema up to date
pub async fn init(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    tracing::info!(migrations = MIGRATOR.iter().count(), "Database schema up to date");
    Ok(pool)
}
