use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::logger::Logger;
use crate::domain::product::cache::{CacheStore, mirror_batch};
use crate::domain::product::errors::ProductError;
use crate::domain::product::ingestion::{
    IngestPayload, IngestReport, RowOutcome, RowStatus, SkipReason, parse_table,
};
use crate::domain::product::model::Product;
use crate::domain::product::repository::ProductRepository;
use crate::domain::product::source::PayloadSource;
use crate::domain::product::use_cases::ingest::{IngestProductsParams, IngestProductsUseCase};

/// Bulk upload: every row is upserted by name inside one store transaction and the
/// stored record is mirrored into the cache right away.
pub struct IngestProductsUseCaseImpl {
    pub repository: Arc<dyn ProductRepository>,
    pub cache: Arc<dyn CacheStore>,
    pub source: Arc<dyn PayloadSource>,
    pub logger: Arc<dyn Logger>,
}

impl IngestProductsUseCaseImpl {
    async fn read_payload(&self, payload: IngestPayload) -> Result<Vec<u8>, ProductError> {
        match payload {
            IngestPayload::Raw(text) => {
                self.logger.info("Processing direct tabular payload");
                Ok(text.into_bytes())
            }
            IngestPayload::Object(object) => {
                self.logger.info(&format!(
                    "Fetching upload {} from bucket {}",
                    object.key, object.bucket
                ));
                self.source.fetch(&object).await
            }
        }
    }

    /// Writes the stored record without expiry and indexes it; both commands go out as
    /// one batch so the index never references an entry that was not written.
    async fn mirror(&self, product: &Product) -> bool {
        let result = match mirror_batch(product) {
            Ok(batch) => self.cache.execute(batch).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                self.logger.warn(&format!(
                    "Error mirroring product {} ({}) to cache: {}",
                    product.name, product.id, err
                ));
                false
            }
        }
    }
}

#[async_trait]
impl IngestProductsUseCase for IngestProductsUseCaseImpl {
    async fn execute(&self, params: IngestProductsParams) -> Result<IngestReport, ProductError> {
        let payload = self.read_payload(params.payload).await?;
        let rows = parse_table(&payload)?;

        let mut transaction = self.repository.begin_bulk_upsert().await.map_err(|err| {
            self.logger
                .error(&format!("Failed to begin upload transaction: {}", err));
            ProductError::IngestFailed
        })?;

        let mut report = IngestReport::default();
        for parsed in rows {
            let status = match parsed.row {
                Err(reason) => {
                    self.logger
                        .warn(&format!("Skipping row {}: {}", parsed.line, reason));
                    RowStatus::Skipped(SkipReason::Parse(reason))
                }
                Ok(row) => match transaction.upsert_by_name(&row).await {
                    Ok(stored) => RowStatus::Upserted {
                        id: stored.id,
                        cache_mirrored: self.mirror(&stored).await,
                    },
                    Err(err) => {
                        self.logger.warn(&format!(
                            "Skipping row {}: upsert of {} failed: {}",
                            parsed.line, row.name, err
                        ));
                        RowStatus::Skipped(SkipReason::Upsert(err.to_string()))
                    }
                },
            };
            report.rows.push(RowOutcome {
                line: parsed.line,
                status,
            });
        }

        transaction.commit().await.map_err(|err| {
            self.logger
                .error(&format!("Failed to commit upload transaction: {}", err));
            ProductError::IngestFailed
        })?;

        self.logger.info(&format!(
            "Upload committed: {} upserted, {} skipped, {} not mirrored to cache",
            report.upserted(),
            report.skipped(),
            report.cache_failures()
        ));
        Ok(report)
    }
}
