//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Client(_) => exitcode::CONFIG,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::MalformedRow { .. }) => exitcode::DATAERR,
                    ApplicationError::Domain(_) => exitcode::SOFTWARE,
                    ApplicationError::Remote { .. } => exitcode::UNAVAILABLE,
                    ApplicationError::Parse { .. } => exitcode::DATAERR,
                    ApplicationError::Input { .. } => exitcode::NOINPUT,
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                },
            },
        }
    }
}
