//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::traits::ApiError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("cannot {action}: {source}")]
    Remote {
        action: String,
        #[source]
        source: ApiError,
    },

    #[error("cannot parse import file{}: {source}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse {
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },

    #[error("{context}: {source}")]
    Input {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    /// Wrap a failed remote call with the action that was attempted.
    pub fn remote(action: impl Into<String>, source: ApiError) -> Self {
        Self::Remote {
            action: action.into(),
            source,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
