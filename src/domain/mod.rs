//! Domain layer: entities and workflow states
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod workflow;

pub use entities::*;
pub use error::DomainError;
pub use workflow::{CreateStage, LoadSummary, RowOutcome};
