/// Repository errors for domain layer.
/// Use code-style identifiers for all error variants for i18n compatibility.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository.not_found")]
    NotFound,
    #[error("repository.transaction")]
    Transaction,
    #[error("repository.database_error")]
    DatabaseError,
}

/// Cache errors. None of them reach the caller of a read: every variant degrades to the store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache.miss")]
    Miss,
    #[error("cache.write_failed")]
    WriteFailed,
    #[error("cache.unavailable")]
    Unavailable,
    #[error("cache.timeout")]
    Timeout,
    #[error("cache.codec")]
    Codec,
}
