use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::CacheError;

use super::model::Product;

/// Set holding the id of every product known to the cache.
pub const ALL_PRODUCT_IDS_KEY: &str = "all_product_ids";

/// Time-to-live of entries rebuilt from the store after a miss.
pub const DEFAULT_REPOPULATE_TTL: Duration = Duration::from_secs(5 * 60);

pub fn product_key(id: &str) -> String {
    format!("product:{}", id)
}

pub fn encode_product(product: &Product) -> Result<String, CacheError> {
    serde_json::to_string(product).map_err(|_| CacheError::Codec)
}

pub fn decode_product(raw: &str) -> Result<Product, CacheError> {
    serde_json::from_str(raw).map_err(|_| CacheError::Codec)
}

/// One command of a pipelined cache batch.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheCommand {
    /// `ttl: None` keeps the entry until it is overwritten.
    Set {
        key: String,
        value: String,
        ttl: Option<Duration>,
    },
    Delete {
        key: String,
    },
    SetAdd {
        key: String,
        members: Vec<String>,
    },
}

/// Commands applied by the cache as a single unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheBatch {
    commands: Vec<CacheCommand>,
}

impl CacheBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: String, value: String, ttl: Option<Duration>) -> Self {
        self.commands.push(CacheCommand::Set { key, value, ttl });
        self
    }

    pub fn delete(mut self, key: String) -> Self {
        self.commands.push(CacheCommand::Delete { key });
        self
    }

    pub fn set_add(mut self, key: String, members: Vec<String>) -> Self {
        if !members.is_empty() {
            self.commands.push(CacheCommand::SetAdd { key, members });
        }
        self
    }

    pub fn commands(&self) -> &[CacheCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<CacheCommand> {
        self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Key/value cache port. Implementations share one long-lived connection.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Members of a set; an absent set yields an empty list.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, CacheError>;

    /// Values for `keys` in one round trip, `None` for absent keys. Same order as `keys`.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError>;

    async fn execute(&self, batch: CacheBatch) -> Result<(), CacheError>;
}

/// Batch that writes `product` without expiry and indexes its id.
pub fn mirror_batch(product: &Product) -> Result<CacheBatch, CacheError> {
    let id = product.id.to_string();
    Ok(CacheBatch::new()
        .set(product_key(&id), encode_product(product)?, None)
        .set_add(ALL_PRODUCT_IDS_KEY.to_string(), vec![id]))
}
