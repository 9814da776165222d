use chrono::{DateTime, Utc};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use business::domain::product::errors::ProductError;
use business::domain::product::ingestion::{
    IngestPayload, IngestReport, ObjectRef, RowOutcome, RowStatus,
};
use business::domain::product::model::Product;

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct ProductResponse {
    /// Product identifier
    pub id: String,
    /// Unique product name
    pub name: String,
    /// Image reference
    pub image: Option<String>,
    /// Unit price, two fractional digits
    pub price: f64,
    /// Units in stock
    pub qty: u32,
    /// Derived from `qty == 0`
    pub out_of_stock: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            image: product.image,
            price: product.price.to_f64(),
            qty: product.qty,
            out_of_stock: product.out_of_stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

// --- DTOs for bulk upload ---

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct BucketDto {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct StoredObjectDto {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct StorageEntityDto {
    pub bucket: BucketDto,
    pub object: StoredObjectDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct StorageEventRecordDto {
    pub s3: StorageEntityDto,
}

/// Either an object-storage notification or the table inline.
#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct UploadProductsRequest {
    /// Storage notification records; only the first one is processed
    #[oai(rename = "Records")]
    #[serde(rename = "Records")]
    pub records: Option<Vec<StorageEventRecordDto>>,
    /// Inline tabular payload, header row first
    pub csv_data: Option<String>,
}

impl UploadProductsRequest {
    pub fn into_payload(self) -> Result<IngestPayload, ProductError> {
        if let Some(record) = self.records.and_then(|records| records.into_iter().next()) {
            return Ok(IngestPayload::Object(ObjectRef {
                bucket: record.s3.bucket.name,
                key: record.s3.object.key,
            }));
        }
        match self.csv_data {
            Some(text) if !text.is_empty() => Ok(IngestPayload::Raw(text)),
            _ => Err(ProductError::MissingPayload),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct RowOutcomeResponse {
    /// Line of the row in the uploaded table
    pub line: u64,
    /// "upserted" or "skipped"
    pub status: String,
    #[oai(skip_serializing_if_is_none)]
    pub id: Option<String>,
    #[oai(skip_serializing_if_is_none)]
    pub cache_mirrored: Option<bool>,
    #[oai(skip_serializing_if_is_none)]
    pub reason: Option<String>,
}

impl From<RowOutcome> for RowOutcomeResponse {
    fn from(outcome: RowOutcome) -> Self {
        match outcome.status {
            RowStatus::Upserted { id, cache_mirrored } => Self {
                line: outcome.line,
                status: "upserted".to_string(),
                id: Some(id.to_string()),
                cache_mirrored: Some(cache_mirrored),
                reason: None,
            },
            RowStatus::Skipped(reason) => Self {
                line: outcome.line,
                status: "skipped".to_string(),
                id: None,
                cache_mirrored: None,
                reason: Some(reason.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct IngestReportResponse {
    pub upserted: u64,
    pub skipped: u64,
    pub cache_failures: u64,
    pub rows: Vec<RowOutcomeResponse>,
}

impl From<IngestReport> for IngestReportResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            upserted: report.upserted() as u64,
            skipped: report.skipped() as u64,
            cache_failures: report.cache_failures() as u64,
            rows: report.rows.into_iter().map(|r| r.into()).collect(),
        }
    }
}
