use std::time::Duration;

use business::domain::product::cache::DEFAULT_REPOPULATE_TTL;

use super::env_or;

/// Catalog behaviour settings
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Lifetime of cache entries rebuilt after a miss
    pub cache_ttl: Duration,
}

impl CatalogConfig {
    /// Environment variables:
    /// - CACHE_TTL_SECS: repopulation TTL in seconds (default: 300)
    pub fn from_env() -> Self {
        let secs = env_or("CACHE_TTL_SECS", DEFAULT_REPOPULATE_TTL.as_secs());
        Self {
            cache_ttl: Duration::from_secs(secs),
        }
    }
}
