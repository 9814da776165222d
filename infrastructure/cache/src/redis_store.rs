use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Pipeline, RedisResult};
use thiserror::Error;

use business::domain::errors::CacheError;
use business::domain::product::cache::{CacheBatch, CacheCommand, CacheStore};

#[derive(Error, Debug)]
pub enum RedisConnectionError {
    #[error("cache.invalid_url")]
    InvalidUrl,
    #[error("cache.connection_error")]
    ConnectionError,
}

/// Configuration for the cache connection
pub struct RedisConfig {
    pub url: String,
    pub connect_timeout: Duration,
    pub operation_timeout: Duration,
}

impl RedisConfig {
    /// Creates a new cache configuration with default values
    pub fn new(url: String) -> Self {
        Self {
            url,
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(2),
        }
    }
}

/// Opens the multiplexed connection shared by every request and checks it with a PING.
pub async fn create_redis_connection(
    config: &RedisConfig,
) -> Result<ConnectionManager, RedisConnectionError> {
    let client =
        redis::Client::open(config.url.as_str()).map_err(|_| RedisConnectionError::InvalidUrl)?;

    let mut connection = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
        .await
        .map_err(|_| RedisConnectionError::ConnectionError)?
        .map_err(|err| {
            tracing::error!("Failed to connect to Redis: {}", err);
            RedisConnectionError::ConnectionError
        })?;

    let pong: RedisResult<String> = redis::cmd("PING").query_async(&mut connection).await;
    let pong = pong.map_err(|err| {
        tracing::error!("Redis did not answer PING: {}", err);
        RedisConnectionError::ConnectionError
    })?;
    tracing::info!("Connected to Redis, ping response: {}", pong);

    Ok(connection)
}

/// `CacheStore` backed by Redis. Batches run as MULTI/EXEC so they apply as one unit.
pub struct RedisCacheStore {
    connection: ConnectionManager,
    operation_timeout: Duration,
}

impl RedisCacheStore {
    pub fn new(connection: ConnectionManager, operation_timeout: Duration) -> Self {
        Self {
            connection,
            operation_timeout,
        }
    }

    async fn with_timeout<T>(
        &self,
        operation: impl Future<Output = RedisResult<T>>,
    ) -> Result<RedisResult<T>, CacheError> {
        tokio::time::timeout(self.operation_timeout, operation)
            .await
            .map_err(|_| {
                tracing::warn!("Redis operation timed out after {:?}", self.operation_timeout);
                CacheError::Timeout
            })
    }
}

pub fn build_pipeline(batch: CacheBatch) -> Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();
    for command in batch.into_commands() {
        match command {
            CacheCommand::Set {
                key,
                value,
                ttl: Some(ttl),
            } => {
                let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
                pipe.cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(millis)
                    .ignore();
            }
            CacheCommand::Set {
                key,
                value,
                ttl: None,
            } => {
                pipe.cmd("SET").arg(key).arg(value).ignore();
            }
            CacheCommand::Delete { key } => {
                pipe.cmd("DEL").arg(key).ignore();
            }
            CacheCommand::SetAdd { key, members } => {
                pipe.cmd("SADD").arg(key).arg(members).ignore();
            }
        }
    }
    pipe
}

/// Turns raw MGET values into text. An entry that is not UTF-8 is dropped on its own
/// so the rest of the reply stays usable.
fn decode_entries(keys: &[String], values: Vec<Option<Vec<u8>>>) -> Vec<Option<String>> {
    keys.iter()
        .zip(values)
        .map(|(key, value)| {
            value.and_then(|bytes| match String::from_utf8(bytes) {
                Ok(text) => Some(text),
                Err(err) => {
                    tracing::warn!("Skipping cache entry {} with non UTF-8 value: {}", key, err);
                    None
                }
            })
        })
        .collect()
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn set_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let mut connection = self.connection.clone();
        let mut cmd = redis::cmd("SMEMBERS");
        cmd.arg(key);

        let result: RedisResult<Vec<String>> =
            self.with_timeout(cmd.query_async(&mut connection)).await?;
        result.map_err(|err| {
            tracing::warn!("Failed to read set {}: {}", key, err);
            CacheError::Unavailable
        })
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut connection = self.connection.clone();
        let mut cmd = redis::cmd("MGET");
        cmd.arg(keys);

        let result: RedisResult<Vec<Option<Vec<u8>>>> =
            self.with_timeout(cmd.query_async(&mut connection)).await?;
        let values = result.map_err(|err| {
            tracing::warn!("Failed to MGET {} keys: {}", keys.len(), err);
            CacheError::Unavailable
        })?;
        Ok(decode_entries(keys, values))
    }

    async fn execute(&self, batch: CacheBatch) -> Result<(), CacheError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut connection = self.connection.clone();
        let pipe = build_pipeline(batch);

        let result: RedisResult<()> = self.with_timeout(pipe.query_async(&mut connection)).await?;
        result.map_err(|err| {
            tracing::warn!("Failed to execute Redis pipeline: {}", err);
            CacheError::WriteFailed
        })
    }
}
