//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violated preconditions of the dictionary workflows.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Edge Dictionary already exists --> Name: {name} ID: {id}")]
    DictionaryExists { name: String, id: String },

    #[error("Edge Dictionary called {name} does not exist on this service")]
    DictionaryNotFound { name: String },

    #[error("version {number} is not valid: {message}")]
    InvalidVersion { number: u32, message: String },

    #[error("Version Number {number} is NOT activated")]
    NotActivated { number: u32 },

    #[error("malformed row at line {line}: expected at least 3 fields, found {fields}")]
    MalformedRow { line: u64, fields: usize },
}
