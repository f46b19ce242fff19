//! I/O boundary traits for testability
//!
//! These traits abstract the remote configuration service and the local
//! filesystem, allowing services to be tested with in-memory implementations.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::domain::{Dictionary, DictionaryItem, ServiceVersion, ValidationResult};

/// Errors reported by the remote configuration service or the transport to it.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("missing API token")]
    MissingToken,

    #[error("API token contains characters not allowed in a header")]
    InvalidToken,

    #[error("invalid API endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Result type for remote configuration calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Remote configuration service capability.
///
/// Every call blocks until the service answers. Implementations hold no
/// per-request state and may be shared freely.
pub trait ConfigApi: Send + Sync {
    /// Highest-numbered version of the service.
    fn latest_version(&self, service_id: &str) -> ApiResult<ServiceVersion>;

    /// Dictionary by name at a version. `ApiError::NotFound` when absent.
    fn get_dictionary(&self, service_id: &str, version: u32, name: &str)
        -> ApiResult<Dictionary>;

    /// Clone a version into a new editable draft.
    fn clone_version(&self, service_id: &str, version: u32) -> ApiResult<ServiceVersion>;

    /// Create an empty dictionary inside a draft version.
    fn create_dictionary(&self, service_id: &str, version: u32, name: &str)
        -> ApiResult<Dictionary>;

    /// Check a version against the service's configuration rules.
    fn validate_version(&self, service_id: &str, version: u32) -> ApiResult<ValidationResult>;

    /// Make a version the live configuration.
    fn activate_version(&self, service_id: &str, version: u32) -> ApiResult<ServiceVersion>;

    /// Add one entry to a dictionary. Duplicate keys are expected to be rejected.
    fn create_dictionary_item(
        &self,
        service_id: &str,
        dictionary_id: &str,
        key: &str,
        value: &str,
    ) -> ApiResult<DictionaryItem>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Open a file for buffered forward reading.
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}
