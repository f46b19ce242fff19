//! Test support: shared logging setup and an in-memory configuration API

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Dictionary, DictionaryItem, ServiceVersion, ValidationResult};
use crate::infrastructure::traits::{ApiError, ApiResult, ConfigApi};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Remote operations, used to select which call a fake should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LatestVersion,
    GetDictionary,
    CloneVersion,
    CreateDictionary,
    ValidateVersion,
    ActivateVersion,
    CreateDictionaryItem,
}

/// One recorded call against [`FakeConfigApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    LatestVersion {
        service_id: String,
    },
    GetDictionary {
        service_id: String,
        version: u32,
        name: String,
    },
    CloneVersion {
        service_id: String,
        version: u32,
    },
    CreateDictionary {
        service_id: String,
        version: u32,
        name: String,
    },
    ValidateVersion {
        service_id: String,
        version: u32,
    },
    ActivateVersion {
        service_id: String,
        version: u32,
    },
    CreateDictionaryItem {
        service_id: String,
        dictionary_id: String,
        key: String,
        value: String,
    },
}

impl ApiCall {
    pub fn operation(&self) -> Operation {
        match self {
            ApiCall::LatestVersion { .. } => Operation::LatestVersion,
            ApiCall::GetDictionary { .. } => Operation::GetDictionary,
            ApiCall::CloneVersion { .. } => Operation::CloneVersion,
            ApiCall::CreateDictionary { .. } => Operation::CreateDictionary,
            ApiCall::ValidateVersion { .. } => Operation::ValidateVersion,
            ApiCall::ActivateVersion { .. } => Operation::ActivateVersion,
            ApiCall::CreateDictionaryItem { .. } => Operation::CreateDictionaryItem,
        }
    }
}

#[derive(Debug)]
struct FakeState {
    versions: Vec<ServiceVersion>,
    /// (version number, dictionary)
    dictionaries: Vec<(u32, Dictionary)>,
    /// (dictionary id, key) -> value
    items: BTreeMap<(String, String), String>,
    validation: ValidationResult,
    activation_takes_effect: bool,
    failing: HashSet<Operation>,
    next_id: u32,
    calls: Vec<ApiCall>,
}

/// In-memory stand-in for the remote configuration service.
///
/// Versions, dictionaries and items behave like the real service for the
/// operations the tools use; every call is recorded in order. Duplicate item
/// keys are rejected with HTTP 409.
#[derive(Debug)]
pub struct FakeConfigApi {
    state: Mutex<FakeState>,
}

impl Default for FakeConfigApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeConfigApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                versions: Vec::new(),
                dictionaries: Vec::new(),
                items: BTreeMap::new(),
                validation: ValidationResult::ok(),
                activation_takes_effect: true,
                failing: HashSet::new(),
                next_id: 1,
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_version(self, number: u32, active: bool) -> Self {
        self.lock().versions.push(ServiceVersion {
            active,
            ..ServiceVersion::draft(number)
        });
        self
    }

    /// Add a dictionary to an existing version.
    pub fn with_dictionary(self, version: u32, name: &str) -> Self {
        {
            let mut state = self.lock();
            let id = state.new_id();
            state.dictionaries.push((
                version,
                Dictionary {
                    id,
                    name: name.to_string(),
                    version: Some(version),
                    write_only: false,
                },
            ));
        }
        self
    }

    /// Pre-populate an item so that uploading the same key is rejected.
    pub fn with_item(self, dictionary_id: &str, key: &str, value: &str) -> Self {
        self.lock()
            .items
            .insert((dictionary_id.to_string(), key.to_string()), value.to_string());
        self
    }

    pub fn with_validation(self, validation: ValidationResult) -> Self {
        self.lock().validation = validation;
        self
    }

    /// Activation calls succeed but leave the version inactive.
    pub fn with_inert_activation(self) -> Self {
        self.lock().activation_takes_effect = false;
        self
    }

    /// Make every call of `operation` fail with HTTP 500.
    pub fn failing(self, operation: Operation) -> Self {
        self.lock().failing.insert(operation);
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Operations called so far, in order.
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().calls.iter().map(ApiCall::operation).collect()
    }

    /// Items stored in a dictionary, by key.
    pub fn items(&self, dictionary_id: &str) -> BTreeMap<String, String> {
        self.lock()
            .items
            .iter()
            .filter(|((id, _), _)| id == dictionary_id)
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Dictionary by name at a version, without recording a call.
    pub fn dictionary(&self, version: u32, name: &str) -> Option<Dictionary> {
        self.lock().find_dictionary(version, name)
    }

    /// Version record by number, without recording a call.
    pub fn version(&self, number: u32) -> Option<ServiceVersion> {
        self.lock().versions.iter().find(|v| v.number == number).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `call` and fail it if its operation is configured to fail.
    fn record(&self, call: ApiCall) -> ApiResult<MutexGuard<'_, FakeState>> {
        let mut state = self.lock();
        let operation = call.operation();
        state.calls.push(call);
        if state.failing.contains(&operation) {
            return Err(ApiError::Http {
                status: 500,
                message: format!("{operation:?} failed"),
            });
        }
        Ok(state)
    }
}

impl FakeState {
    fn new_id(&mut self) -> String {
        let id = format!("dict-{}", self.next_id);
        self.next_id += 1;
        id
    }

    fn find_dictionary(&self, version: u32, name: &str) -> Option<Dictionary> {
        self.dictionaries
            .iter()
            .find(|(v, d)| *v == version && d.name == name)
            .map(|(_, d)| d.clone())
    }

    fn find_version(&mut self, number: u32) -> ApiResult<&mut ServiceVersion> {
        self.versions
            .iter_mut()
            .find(|v| v.number == number)
            .ok_or_else(|| ApiError::NotFound {
                message: format!("version {number} not found"),
            })
    }
}

impl ConfigApi for FakeConfigApi {
    fn latest_version(&self, service_id: &str) -> ApiResult<ServiceVersion> {
        let state = self.record(ApiCall::LatestVersion {
            service_id: service_id.to_string(),
        })?;
        state
            .versions
            .iter()
            .max_by_key(|v| v.number)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                message: format!("service {service_id} has no versions"),
            })
    }

    fn get_dictionary(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<Dictionary> {
        let state = self.record(ApiCall::GetDictionary {
            service_id: service_id.to_string(),
            version,
            name: name.to_string(),
        })?;
        state
            .find_dictionary(version, name)
            .ok_or_else(|| ApiError::NotFound {
                message: "Record not found".to_string(),
            })
    }

    fn clone_version(&self, service_id: &str, version: u32) -> ApiResult<ServiceVersion> {
        let mut state = self.record(ApiCall::CloneVersion {
            service_id: service_id.to_string(),
            version,
        })?;
        state.find_version(version)?;
        let number = state.versions.iter().map(|v| v.number).max().unwrap_or(0) + 1;
        let copied: Vec<(u32, Dictionary)> = state
            .dictionaries
            .iter()
            .filter(|(v, _)| *v == version)
            .map(|(_, d)| {
                (
                    number,
                    Dictionary {
                        version: Some(number),
                        ..d.clone()
                    },
                )
            })
            .collect();
        state.dictionaries.extend(copied);
        let draft = ServiceVersion::draft(number);
        state.versions.push(draft.clone());
        Ok(draft)
    }

    fn create_dictionary(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<Dictionary> {
        let mut state = self.record(ApiCall::CreateDictionary {
            service_id: service_id.to_string(),
            version,
            name: name.to_string(),
        })?;
        state.find_version(version)?;
        if state.find_dictionary(version, name).is_some() {
            return Err(ApiError::Http {
                status: 409,
                message: "Duplicate record".to_string(),
            });
        }
        let dictionary = Dictionary {
            id: state.new_id(),
            name: name.to_string(),
            version: Some(version),
            write_only: false,
        };
        state.dictionaries.push((version, dictionary.clone()));
        Ok(dictionary)
    }

    fn validate_version(&self, service_id: &str, version: u32) -> ApiResult<ValidationResult> {
        let mut state = self.record(ApiCall::ValidateVersion {
            service_id: service_id.to_string(),
            version,
        })?;
        state.find_version(version)?;
        Ok(state.validation.clone())
    }

    fn activate_version(&self, service_id: &str, version: u32) -> ApiResult<ServiceVersion> {
        let mut state = self.record(ApiCall::ActivateVersion {
            service_id: service_id.to_string(),
            version,
        })?;
        state.find_version(version)?;
        if !state.activation_takes_effect {
            return Ok(ServiceVersion::draft(version));
        }
        for v in state.versions.iter_mut() {
            v.active = v.number == version;
        }
        let activated = state.find_version(version)?;
        Ok(activated.clone())
    }

    fn create_dictionary_item(
        &self,
        service_id: &str,
        dictionary_id: &str,
        key: &str,
        value: &str,
    ) -> ApiResult<DictionaryItem> {
        let mut state = self.record(ApiCall::CreateDictionaryItem {
            service_id: service_id.to_string(),
            dictionary_id: dictionary_id.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })?;
        if !state.dictionaries.iter().any(|(_, d)| d.id == dictionary_id) {
            return Err(ApiError::NotFound {
                message: format!("dictionary {dictionary_id} not found"),
            });
        }
        let slot = (dictionary_id.to_string(), key.to_string());
        if state.items.contains_key(&slot) {
            return Err(ApiError::Http {
                status: 409,
                message: "Duplicate record".to_string(),
            });
        }
        state.items.insert(slot, value.to_string());
        Ok(DictionaryItem {
            dictionary_id: dictionary_id.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}
