//! Storage error types.

/// Errors surfaced by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No stored record exists for the requested key.
    #[error("not found")]
    NotFound,

    /// Cursor pagination was requested from a backend that only supports
    /// offset pagination.
    #[error("cursor pagination not supported; use offset")]
    OnlyOffset,

    #[error("pagination invalid: {0}")]
    InvalidPagination(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("encoding record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database: {0}")]
    Database(String),
}

impl From<diesel::result::Error> for StorageError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => StorageError::NotFound,
            other => StorageError::Database(other.to_string()),
        }
    }
}
