use std::sync::Arc;

use cache::redis_store::RedisCacheStore;
use logger::TracingLogger;
use persistence::product::repository::ProductRepositoryPostgres;
use storage::local_object_store::LocalObjectStore;

use business::application::product::get_all::GetAllProductsUseCaseImpl;
use business::application::product::ingest::IngestProductsUseCaseImpl;
use business::application::tasks::TokioTaskSpawner;

use crate::config::app_config::AppConfig;

pub struct DependencyContainer {
    pub health_api: crate::api::health::routes::HealthApi,
    pub product_api: crate::api::product::routes::ProductApi,
}

impl DependencyContainer {
    /// Builds every adapter once; use cases share them for the life of the process.
    pub fn new(pool: sqlx::PgPool, cache_store: RedisCacheStore, config: &AppConfig) -> Self {
        let logger = Arc::new(TracingLogger);
        let health_api = crate::api::health::routes::HealthApi;

        // Infrastructure adapters
        let product_repository = Arc::new(ProductRepositoryPostgres::new(pool));
        let cache_store = Arc::new(cache_store);
        let payload_source = Arc::new(LocalObjectStore::new(config.storage.root.clone()));
        let spawner = Arc::new(TokioTaskSpawner);

        // Product use cases
        let get_all_use_case = Arc::new(GetAllProductsUseCaseImpl {
            repository: product_repository.clone(),
            cache: cache_store.clone(),
            spawner,
            logger: logger.clone(),
            cache_ttl: config.catalog.cache_ttl,
        });
        let ingest_use_case = Arc::new(IngestProductsUseCaseImpl {
            repository: product_repository,
            cache: cache_store,
            source: payload_source,
            logger,
        });

        let product_api =
            crate::api::product::routes::ProductApi::new(get_all_use_case, ingest_use_case);

        Self {
            health_api,
            product_api,
        }
    }
}
