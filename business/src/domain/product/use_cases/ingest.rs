use async_trait::async_trait;

use crate::domain::product::errors::ProductError;
use crate::domain::product::ingestion::{IngestPayload, IngestReport};

pub struct IngestProductsParams {
    pub payload: IngestPayload,
}

#[async_trait]
pub trait IngestProductsUseCase: Send + Sync {
    async fn execute(&self, params: IngestProductsParams) -> Result<IngestReport, ProductError>;
}
