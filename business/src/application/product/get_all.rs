use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::product::repopulate::repopulate;
use crate::domain::errors::CacheError;
use crate::domain::logger::Logger;
use crate::domain::product::cache::{
    ALL_PRODUCT_IDS_KEY, CacheStore, decode_product, product_key,
};
use crate::domain::product::errors::ProductError;
use crate::domain::product::model::Product;
use crate::domain::product::repository::ProductRepository;
use crate::domain::product::use_cases::get_all::GetAllProductsUseCase;
use crate::domain::tasks::TaskSpawner;

/// Cache-aside catalog listing.
///
/// Serves from the cache when it yields at least one product, otherwise reads the store
/// and schedules a background rebuild of the cache. Cache problems never reach the caller.
pub struct GetAllProductsUseCaseImpl {
    pub repository: Arc<dyn ProductRepository>,
    pub cache: Arc<dyn CacheStore>,
    pub spawner: Arc<dyn TaskSpawner>,
    pub logger: Arc<dyn Logger>,
    pub cache_ttl: Duration,
}

impl GetAllProductsUseCaseImpl {
    async fn fetch_from_cache(&self) -> Result<Vec<Product>, CacheError> {
        let ids = self.cache.set_members(ALL_PRODUCT_IDS_KEY).await?;
        if ids.is_empty() {
            return Err(CacheError::Miss);
        }

        let keys: Vec<String> = ids.iter().map(|id| product_key(id)).collect();
        let entries = self.cache.get_many(&keys).await?;

        let mut products = Vec::with_capacity(entries.len());
        for (key, entry) in keys.iter().zip(entries) {
            let Some(raw) = entry else {
                self.logger
                    .debug(&format!("Cache entry {} is gone, skipping", key));
                continue;
            };
            match decode_product(&raw) {
                Ok(product) => products.push(product),
                Err(err) => self
                    .logger
                    .warn(&format!("Skipping cache entry {}: {}", key, err)),
            }
        }

        // Index entries without any usable product: distrust the cache entirely.
        if products.is_empty() {
            return Err(CacheError::Miss);
        }
        Ok(products)
    }

    async fn load_from_store(&self) -> Result<Vec<Product>, ProductError> {
        self.repository.get_all().await.map_err(|err| {
            self.logger
                .error(&format!("Error fetching products from store: {}", err));
            ProductError::Unavailable
        })
    }

    fn schedule_repopulate(&self, products: Vec<Product>) {
        let cache = self.cache.clone();
        let logger = self.logger.clone();
        let ttl = self.cache_ttl;

        self.spawner.spawn(Box::pin(async move {
            match repopulate(cache.as_ref(), &products, ttl).await {
                Ok(()) => logger.info(&format!("Cache populated with {} products", products.len())),
                Err(err) => logger.error(&format!(
                    "Failed to populate cache after store fetch: {}",
                    err
                )),
            }
        }));
    }
}

#[async_trait]
impl GetAllProductsUseCase for GetAllProductsUseCaseImpl {
    async fn execute(&self) -> Result<Vec<Product>, ProductError> {
        match self.fetch_from_cache().await {
            Ok(products) => {
                self.logger.info(&format!(
                    "Retrieved {} products from cache",
                    products.len()
                ));
                Ok(products)
            }
            Err(reason) => {
                self.logger
                    .info(&format!("Cache unusable ({}), falling back to store", reason));
                let products = self.load_from_store().await?;
                self.logger.info(&format!(
                    "Retrieved {} products from store",
                    products.len()
                ));
                self.schedule_repopulate(products.clone());
                Ok(products)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tasks::TokioTaskSpawner;
    use crate::domain::errors::RepositoryError;
    use crate::domain::product::cache::encode_product;
    use crate::domain::product::repository::ProductUpsertTransaction;
    use crate::test_support::{
        DeferredSpawner, InMemoryCache, InMemoryStore, eventually, mock_logger, product,
    };
    use mockall::mock;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;

    const TTL: Duration = Duration::from_secs(300);

    mock! {
        pub ProductRepo {}

        #[async_trait]
        impl ProductRepository for ProductRepo {
            async fn get_all(&self) -> Result<Vec<Product>, RepositoryError>;
            async fn begin_bulk_upsert(&self) -> Result<Box<dyn ProductUpsertTransaction>, RepositoryError>;
        }
    }

    fn use_case(
        repository: Arc<dyn ProductRepository>,
        cache: Arc<dyn CacheStore>,
        spawner: Arc<dyn TaskSpawner>,
    ) -> GetAllProductsUseCaseImpl {
        GetAllProductsUseCaseImpl {
            repository,
            cache,
            spawner,
            logger: mock_logger(),
            cache_ttl: TTL,
        }
    }

    fn seed(cache: &InMemoryCache, products: &[Product]) {
        for p in products {
            let id = p.id.to_string();
            cache.put_raw(&product_key(&id), &encode_product(p).unwrap());
            cache.add_member(ALL_PRODUCT_IDS_KEY, &id);
        }
    }

    fn ids(products: &[Product]) -> HashSet<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[tokio::test]
    async fn should_serve_from_cache_without_touching_store() {
        let cached = vec![product("Apple", "1.00", 2), product("Pear", "2.00", 0)];
        let cache = Arc::new(InMemoryCache::default());
        seed(&cache, &cached);
        let mut repo = MockProductRepo::new();
        repo.expect_get_all().never();
        let spawner = Arc::new(DeferredSpawner::default());

        let result = use_case(Arc::new(repo), cache, spawner.clone())
            .execute()
            .await
            .unwrap();

        assert_eq!(result, cached);
        assert_eq!(spawner.pending(), 0);
    }

    #[tokio::test]
    async fn should_fall_back_to_store_when_index_missing() {
        let stored = vec![product("Apple", "1.00", 2), product("Banana", "0.50", 9)];
        let store = Arc::new(InMemoryStore::with(stored.clone()));
        let cache = Arc::new(InMemoryCache::default());

        let result = use_case(store, cache.clone(), Arc::new(TokioTaskSpawner))
            .execute()
            .await
            .unwrap();

        assert_eq!(result, stored);
        eventually(|| cache.members(ALL_PRODUCT_IDS_KEY).len() == 2).await;
        for p in &stored {
            assert_eq!(
                cache.ttl(&product_key(&p.id.to_string())),
                Some(Some(TTL))
            );
        }
    }

    #[tokio::test]
    async fn should_fall_back_to_store_sorted_by_name_when_every_entry_expired() {
        let stored = vec![
            product("Cherry", "3.00", 1),
            product("Apple", "1.00", 2),
            product("Banana", "0.50", 0),
        ];
        let cache = Arc::new(InMemoryCache::default());
        seed(&cache, &stored);
        for p in &stored {
            cache.expire(&product_key(&p.id.to_string()));
        }
        let store = Arc::new(InMemoryStore::with(stored));

        let result = use_case(store, cache, Arc::new(DeferredSpawner::default()))
            .execute()
            .await
            .unwrap();

        let names: Vec<&str> = result.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Banana", "Cherry"]);
    }

    #[tokio::test]
    async fn should_skip_missing_and_corrupt_entries_when_some_remain() {
        let kept = product("Apple", "1.00", 2);
        let expired = product("Pear", "2.00", 1);
        let cache = Arc::new(InMemoryCache::default());
        seed(&cache, &[kept.clone(), expired.clone()]);
        cache.expire(&product_key(&expired.id.to_string()));
        cache.put_raw("product:corrupt", "{oops");
        cache.add_member(ALL_PRODUCT_IDS_KEY, "corrupt");
        let mut repo = MockProductRepo::new();
        repo.expect_get_all().never();

        let result = use_case(
            Arc::new(repo),
            cache,
            Arc::new(DeferredSpawner::default()),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(result, vec![kept]);
    }

    #[tokio::test]
    async fn should_fall_back_when_every_entry_is_corrupt() {
        let stored = vec![product("Apple", "1.00", 2)];
        let cache = Arc::new(InMemoryCache::default());
        cache.put_raw("product:x", "not json");
        cache.add_member(ALL_PRODUCT_IDS_KEY, "x");

        let result = use_case(
            Arc::new(InMemoryStore::with(stored.clone())),
            cache,
            Arc::new(DeferredSpawner::default()),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(result, stored);
    }

    #[tokio::test]
    async fn should_fall_back_when_cache_unreachable() {
        let stored = vec![product("Apple", "1.00", 2)];
        let cache = Arc::new(InMemoryCache::default());
        cache.fail_reads.store(true, Ordering::SeqCst);

        let result = use_case(
            Arc::new(InMemoryStore::with(stored.clone())),
            cache,
            Arc::new(DeferredSpawner::default()),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(result, stored);
    }

    #[tokio::test]
    async fn should_return_before_repopulation_runs() {
        let stored = vec![product("Apple", "1.00", 2)];
        let cache = Arc::new(InMemoryCache::default());
        let spawner = Arc::new(DeferredSpawner::default());

        let result = use_case(
            Arc::new(InMemoryStore::with(stored.clone())),
            cache.clone(),
            spawner.clone(),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(result, stored);
        assert!(cache.is_untouched());
        assert_eq!(spawner.pending(), 1);

        spawner.run_all().await;
        assert_eq!(cache.members(ALL_PRODUCT_IDS_KEY), vec![stored[0].id.to_string()]);
    }

    #[tokio::test]
    async fn should_swallow_repopulation_failure() {
        let stored = vec![product("Apple", "1.00", 2)];
        let cache = Arc::new(InMemoryCache::default());
        cache.fail_writes.store(true, Ordering::SeqCst);
        let spawner = Arc::new(DeferredSpawner::default());

        let result = use_case(
            Arc::new(InMemoryStore::with(stored.clone())),
            cache.clone(),
            spawner.clone(),
        )
        .execute()
        .await;
        spawner.run_all().await;

        assert_eq!(result.unwrap(), stored);
        assert!(cache.is_untouched());
    }

    #[tokio::test]
    async fn should_report_unavailable_when_cache_and_store_fail() {
        let cache = Arc::new(InMemoryCache::default());
        cache.fail_reads.store(true, Ordering::SeqCst);
        let mut repo = MockProductRepo::new();
        repo.expect_get_all()
            .returning(|| Err(RepositoryError::DatabaseError));
        let spawner = Arc::new(DeferredSpawner::default());

        let result = use_case(Arc::new(repo), cache, spawner.clone())
            .execute()
            .await;

        assert!(matches!(result, Err(ProductError::Unavailable)));
        assert_eq!(spawner.pending(), 0);
    }

    proptest! {
        #[test]
        fn should_list_exactly_the_repopulated_ids(
            specs in proptest::collection::vec(("[a-z]{1,8}", 0u32..50), 1..20)
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let products: Vec<Product> = specs
                .iter()
                .map(|(name, qty)| product(name, "1.00", *qty))
                .collect();

            let listed = runtime.block_on(async {
                let cache = Arc::new(InMemoryCache::default());
                repopulate(cache.as_ref(), &products, TTL).await.unwrap();
                let mut repo = MockProductRepo::new();
                repo.expect_get_all().never();
                use_case(Arc::new(repo), cache, Arc::new(DeferredSpawner::default()))
                    .execute()
                    .await
                    .unwrap()
            });

            prop_assert_eq!(ids(&listed), ids(&products));
            for listed_product in &listed {
                let original = products.iter().find(|p| p.id == listed_product.id);
                prop_assert_eq!(Some(listed_product), original);
            }
        }
    }
}
