//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::traits::ApiError;

/// Infrastructure errors wrap application errors and add client construction failures.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot create API client: {0}")]
    Client(#[source] ApiError),
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
