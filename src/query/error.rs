use super::store::StoreError;
use thiserror::Error;

/// Errors raised while running a criteria query
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("filters parameter is mandatory")]
    MissingFilters,

    #[error("Invalid limit: {0}. The limit must be a positive integer")]
    InvalidLimit(u32),

    #[error("Count query returned no usable 'total' column")]
    MalformedCount,

    #[error(transparent)]
    Store(#[from] StoreError),
}
