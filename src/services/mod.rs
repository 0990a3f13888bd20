use thiserror::Error;

use crate::repository::errors::RepositoryError;

pub mod employees;

/// Failures surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input that cannot be normalized.
    #[error("validation error: {0}")]
    Validation(String),

    /// The data store could not be reached or did not answer in time.
    #[error("data store unavailable: {0}")]
    StoreUnavailable(String),

    /// The data store rejected the query.
    #[error("data store query failed: {0}")]
    StoreQuery(String),

    /// The caller cancelled the request before the store answered.
    #[error("request cancelled")]
    Cancelled,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ConnectionError(message) => ServiceError::StoreUnavailable(message),
            other => ServiceError::StoreQuery(other.to_string()),
        }
    }
}
