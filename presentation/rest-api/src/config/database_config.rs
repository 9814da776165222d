use anyhow::Context;
use persistence::db::{DatabaseConfig, create_postgres_pool, run_migrations};
use sqlx::PgPool;
use std::env;
use std::time::Duration;

use super::env_or;

/// Initialize database connection pool from environment variables
///
/// Environment variables:
/// - DATABASE_URL: PostgreSQL connection string (required)
/// - DATABASE_MAX_CONNECTIONS: pool size (default: 25)
/// - DATABASE_ACQUIRE_TIMEOUT_SECS: wait for a pooled connection (default: 5)
/// - MIGRATIONS_PATH: when set, migrations in this directory run at startup
///
/// # Errors
/// Returns error if DATABASE_URL is not set, connection fails or migrations fail
pub async fn init_database() -> anyhow::Result<PgPool> {
    let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let mut config = DatabaseConfig::new(db_url);
    config.max_connections = env_or("DATABASE_MAX_CONNECTIONS", config.max_connections);
    config.acquire_timeout = Duration::from_secs(env_or(
        "DATABASE_ACQUIRE_TIMEOUT_SECS",
        config.acquire_timeout.as_secs(),
    ));

    let pool = create_postgres_pool(&config).await?;

    if let Ok(path) = env::var("MIGRATIONS_PATH") {
        run_migrations(&pool, &path).await?;
        tracing::info!("Migrations applied from {}", path);
    }

    Ok(pool)
}
