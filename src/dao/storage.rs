use std::error::Error;
use thiserror::Error;

/// Result alias for document store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by any document store backend.
///
/// Services only need to know the store could not answer, or that a write collided
/// with a unique field. The backend error is kept as the source for logging.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("duplicate value for unique field `{field}`")]
    Conflict { field: &'static str },
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap a backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// A write would break the uniqueness of `field`.
    pub fn conflict(field: &'static str) -> Self {
        StorageError::Conflict { field }
    }
}
