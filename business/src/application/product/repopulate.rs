use std::time::Duration;

use crate::domain::errors::CacheError;
use crate::domain::product::cache::{
    ALL_PRODUCT_IDS_KEY, CacheBatch, CacheStore, encode_product, product_key,
};
use crate::domain::product::model::Product;

/// Rebuilds the cache from `products` in a single batch.
///
/// Each product gets its own entry expiring after `ttl`; the id index is deleted and
/// recreated so it lists exactly `products`. Running it twice with the same input
/// leaves the cache in the same state.
pub async fn repopulate(
    cache: &dyn CacheStore,
    products: &[Product],
    ttl: Duration,
) -> Result<(), CacheError> {
    let mut batch = CacheBatch::new();
    let mut ids = Vec::with_capacity(products.len());
    for product in products {
        let id = product.id.to_string();
        batch = batch.set(product_key(&id), encode_product(product)?, Some(ttl));
        ids.push(id);
    }
    let batch = batch
        .delete(ALL_PRODUCT_IDS_KEY.to_string())
        .set_add(ALL_PRODUCT_IDS_KEY.to_string(), ids);

    cache.execute(batch).await
}
