//! Dictionary creation service
//!
//! Creates an empty edge dictionary in a clone of the latest version, then
//! validates and activates that clone. The live version is never edited.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{CreateStage, Dictionary, DomainError, ServiceVersion};
use crate::infrastructure::traits::{ApiError, ConfigApi};

/// Dictionary created by a successful run, with the version that went live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDictionary {
    pub dictionary: Dictionary,
    pub version: ServiceVersion,
}

/// Service for creating and activating edge dictionaries.
pub struct DictionaryCreator {
    api: Arc<dyn ConfigApi>,
}

/// Current stage of one run; aborts are reported against it.
struct Progress {
    stage: CreateStage,
}

impl Progress {
    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            debug!("stage: {} -> {}", self.stage, next);
            self.stage = next;
        }
    }

    fn abort(&self, source: ApiError) -> ApplicationError {
        warn!("aborting at stage {}: {}", self.stage, source);
        ApplicationError::remote(self.stage.pending_action(), source)
    }
}

impl DictionaryCreator {
    /// Create a new dictionary creator.
    pub fn new(api: Arc<dyn ConfigApi>) -> Self {
        Self { api }
    }

    /// Create `name` on `service_id` and activate the resulting version.
    pub fn create(&self, service_id: &str, name: &str) -> ApplicationResult<CreatedDictionary> {
        self.create_with(service_id, name, |_| {})
    }

    /// Like [`create`](Self::create), calling `on_created` as soon as the
    /// dictionary exists in the draft version, before validation.
    pub fn create_with(
        &self,
        service_id: &str,
        name: &str,
        mut on_created: impl FnMut(&Dictionary),
    ) -> ApplicationResult<CreatedDictionary> {
        debug!("create: service={} dictionary={}", service_id, name);
        let mut progress = Progress {
            stage: CreateStage::Start,
        };

        let latest = self
            .api
            .latest_version(service_id)
            .map_err(|e| progress.abort(e))?;
        progress.advance();

        match self.api.get_dictionary(service_id, latest.number, name) {
            Ok(existing) => {
                warn!(
                    "dictionary {} already exists in version {}",
                    existing.name, latest.number
                );
                return Err(DomainError::DictionaryExists {
                    name: existing.name,
                    id: existing.id,
                }
                .into());
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(progress.abort(e)),
        }
        progress.advance();

        let draft = self
            .api
            .clone_version(service_id, latest.number)
            .map_err(|e| progress.abort(e))?;
        info!("cloned version {} into {}", latest.number, draft.number);
        progress.advance();

        let dictionary = self
            .api
            .create_dictionary(service_id, draft.number, name)
            .map_err(|e| progress.abort(e))?;
        on_created(&dictionary);
        progress.advance();

        let validation = self
            .api
            .validate_version(service_id, draft.number)
            .map_err(|e| progress.abort(e))?;
        if !validation.valid {
            return Err(DomainError::InvalidVersion {
                number: draft.number,
                message: validation.message,
            }
            .into());
        }
        progress.advance();

        let activated = self
            .api
            .activate_version(service_id, draft.number)
            .map_err(|e| progress.abort(e))?;
        // The call can succeed without the version going live.
        if !activated.active {
            return Err(DomainError::NotActivated {
                number: activated.number,
            }
            .into());
        }
        progress.advance();

        info!("version {} is active", activated.number);
        Ok(CreatedDictionary {
            dictionary,
            version: activated,
        })
    }
}
