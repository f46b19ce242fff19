//! Service container for dependency injection
//!
//! Wires up the dictionary services with their dependencies.

use std::sync::Arc;

use crate::application::services::{DictionaryBulkLoader, DictionaryCreator};
use crate::config::Settings;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::fastly::FastlyClient;
use crate::infrastructure::traits::{ConfigApi, FileSystem, RealFileSystem};

/// Container holding the settings and I/O handles shared by all services.
///
/// One container is built per process; the API client inside it is reused
/// for every remote call.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Remote configuration API
    pub api: Arc<dyn ConfigApi>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a container talking to the real API with `token`.
    pub fn new(settings: Settings, token: &str) -> InfraResult<Self> {
        let client = FastlyClient::new(&settings.client_config(token)).map_err(InfraError::Client)?;
        Ok(Self::with_deps(
            settings,
            Arc::new(client),
            Arc::new(RealFileSystem),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        api: Arc<dyn ConfigApi>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self { settings, api, fs }
    }

    pub fn creator(&self) -> DictionaryCreator {
        DictionaryCreator::new(self.api.clone())
    }

    pub fn bulk_loader(&self) -> DictionaryBulkLoader {
        DictionaryBulkLoader::new(self.api.clone(), self.fs.clone())
    }
}
