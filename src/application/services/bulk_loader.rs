//! Bulk loading of dictionary items from CSV
//!
//! Rows are uploaded one at a time in file order. A row that cannot be used
//! or is rejected by the service is reported and skipped; an unreadable
//! record ends the run.

use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::import::ImportRows;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Dictionary, DomainError, ImportRow, LoadSummary, RowOutcome};
use crate::infrastructure::traits::{ConfigApi, FileSystem};

/// Service for loading CSV rows into an existing dictionary.
pub struct DictionaryBulkLoader {
    api: Arc<dyn ConfigApi>,
    fs: Arc<dyn FileSystem>,
}

impl DictionaryBulkLoader {
    /// Create a new bulk loader.
    pub fn new(api: Arc<dyn ConfigApi>, fs: Arc<dyn FileSystem>) -> Self {
        Self { api, fs }
    }

    /// Find dictionary `name` in the latest version of `service_id`.
    ///
    /// Items are addressed by dictionary ID, so no version is cloned.
    pub fn resolve_dictionary(&self, service_id: &str, name: &str) -> ApplicationResult<Dictionary> {
        let latest = self
            .api
            .latest_version(service_id)
            .map_err(|e| ApplicationError::remote("fetch latest version", e))?;
        debug!("resolve_dictionary: latest version {}", latest.number);

        match self.api.get_dictionary(service_id, latest.number, name) {
            Ok(dictionary) => Ok(dictionary),
            Err(e) if e.is_not_found() => Err(DomainError::DictionaryNotFound {
                name: name.to_string(),
            }
            .into()),
            Err(e) => Err(ApplicationError::remote("look up dictionary", e)),
        }
    }

    /// Load every row of the CSV file at `path` into dictionary `name`.
    ///
    /// `on_outcome` is called once per row, as soon as the row is processed.
    #[instrument(skip(self, on_outcome))]
    pub fn load_file(
        &self,
        service_id: &str,
        name: &str,
        path: &Path,
        on_outcome: impl FnMut(&RowOutcome),
    ) -> ApplicationResult<LoadSummary> {
        let dictionary = self.resolve_dictionary(service_id, name)?;
        if self.fs.is_dir(path) {
            return Err(ApplicationError::Input {
                context: format!("cannot open import file: {}", path.display()),
                source: io::Error::new(io::ErrorKind::InvalidInput, "is a directory"),
            });
        }
        let input = self
            .fs
            .open_read(path)
            .with_path_context("cannot open import file", path)?;
        self.load_rows(service_id, &dictionary, input, on_outcome)
    }

    /// Load rows read from `input` into `dictionary`.
    pub fn load_rows<R: Read>(
        &self,
        service_id: &str,
        dictionary: &Dictionary,
        input: R,
        mut on_outcome: impl FnMut(&RowOutcome),
    ) -> ApplicationResult<LoadSummary> {
        let mut summary = LoadSummary::default();

        for row in ImportRows::new(input) {
            let row = row?;
            let outcome = self.upload_row(service_id, dictionary, &row);
            summary.record(&outcome);
            on_outcome(&outcome);
        }

        info!("load finished: {}", summary);
        Ok(summary)
    }

    fn upload_row(&self, service_id: &str, dictionary: &Dictionary, row: &ImportRow) -> RowOutcome {
        let (key, value) = match row.entry() {
            Ok(entry) => entry,
            Err(reason) => {
                debug!("line {}: {}", row.line, reason);
                return RowOutcome::Skipped {
                    line: row.line,
                    reason,
                };
            }
        };

        match self
            .api
            .create_dictionary_item(service_id, &dictionary.id, key, value)
        {
            Ok(item) => RowOutcome::Added {
                key: item.key,
                value: item.value,
            },
            Err(e) => {
                debug!("line {}: item {} rejected: {}", row.line, key, e);
                RowOutcome::Rejected {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            }
        }
    }
}
