//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (ConfigApi, FileSystem)
//! but are themselves concrete structs, not traits.

mod bulk_loader;
mod creator;

pub use bulk_loader::DictionaryBulkLoader;
pub use creator::{CreatedDictionary, DictionaryCreator};
