use async_trait::async_trait;

use crate::domain::errors::RepositoryError;

use super::model::{Product, ProductRow};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products ordered by `name` ascending. Rows that cannot be decoded are skipped.
    async fn get_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Opens the batch-wide transaction used by bulk uploads.
    async fn begin_bulk_upsert(&self)
    -> Result<Box<dyn ProductUpsertTransaction>, RepositoryError>;
}

/// A store transaction spanning one upload batch.
///
/// Dropping it without `commit` rolls every row back.
#[async_trait]
pub trait ProductUpsertTransaction: Send {
    /// Inserts `row`, or updates the product already holding `row.name`, then re-reads it
    /// by name inside the transaction. A failure here affects this row only: the
    /// transaction stays usable for the following rows.
    async fn upsert_by_name(&mut self, row: &ProductRow) -> Result<Product, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}
