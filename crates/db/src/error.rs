//! Error types for document store operations.

use thiserror::Error;

/// Failures raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The client could not be configured or the server could not be reached at startup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The backend rejected or failed an operation.
    #[error("{0}")]
    Backend(String),
}

/// A specialized `Result` type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
