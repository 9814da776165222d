use async_trait::async_trait;

use super::errors::ProductError;
use super::ingestion::ObjectRef;

/// Port for retrieving uploads kept in external object storage.
#[async_trait]
pub trait PayloadSource: Send + Sync {
    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<u8>, ProductError>;
}
