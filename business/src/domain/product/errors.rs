#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("product.unavailable")]
    Unavailable,
    #[error("product.empty_input")]
    EmptyInput,
    #[error("product.malformed_payload")]
    MalformedPayload,
    #[error("product.missing_payload")]
    MissingPayload,
    #[error("product.source_unavailable")]
    SourceUnavailable,
    #[error("product.ingest_failed")]
    IngestFailed,
}

/// Why an upload row was rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowParseError {
    #[error("row.insufficient_columns: expected 5, found {0}")]
    InsufficientColumns(usize),
    #[error("row.blank_name")]
    BlankName,
    #[error("row.invalid_id: {0}")]
    InvalidId(String),
    #[error("row.invalid_price: {0}")]
    InvalidPrice(String),
    #[error("row.invalid_quantity: {0}")]
    InvalidQuantity(String),
}
