use anyhow::Context;
use cache::redis_store::{RedisCacheStore, RedisConfig, create_redis_connection};
use std::env;
use std::time::Duration;

use super::env_or;

/// Initialize the cache client from environment variables
///
/// Environment variables:
/// - REDIS_URL: Redis connection string (required)
/// - REDIS_OPERATION_TIMEOUT_MS: per-command timeout (default: 2000)
///
/// # Errors
/// Returns error if REDIS_URL is not set or the server does not answer
pub async fn init_cache() -> anyhow::Result<RedisCacheStore> {
    let url = env::var("REDIS_URL").context("REDIS_URL must be set")?;

    let mut config = RedisConfig::new(url);
    config.operation_timeout = Duration::from_millis(env_or(
        "REDIS_OPERATION_TIMEOUT_MS",
        config.operation_timeout.as_millis() as u64,
    ));

    let connection = create_redis_connection(&config).await?;
    Ok(RedisCacheStore::new(connection, config.operation_timeout))
}
