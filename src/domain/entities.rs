//! Domain entities: values read from or written to the remote configuration service

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Numbered snapshot of a service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceVersion {
    pub number: u32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ServiceVersion {
    /// Version record as returned before activation.
    pub fn draft(number: u32) -> Self {
        Self {
            number,
            active: false,
            locked: false,
            comment: None,
        }
    }
}

/// Named key-value table attached to a service version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub write_only: bool,
}

/// One key-value pair inside a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryItem {
    #[serde(default)]
    pub dictionary_id: String,
    #[serde(rename = "item_key")]
    pub key: String,
    #[serde(rename = "item_value")]
    pub value: String,
}

/// Outcome of validating a draft version against the service's rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Column holding the dictionary key.
pub const KEY_COLUMN: usize = 0;
/// Column holding the dictionary value. Column 1 is ignored.
pub const VALUE_COLUMN: usize = 2;

/// One parsed record of the import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based line number the record started on
    pub line: u64,
    pub fields: Vec<String>,
}

impl ImportRow {
    /// Build a row, rejecting records too short to carry a value column.
    pub fn new(line: u64, fields: Vec<String>) -> Result<Self, DomainError> {
        if fields.len() <= VALUE_COLUMN {
            return Err(DomainError::MalformedRow {
                line,
                fields: fields.len(),
            });
        }
        Ok(Self { line, fields })
    }

    pub fn key(&self) -> &str {
        &self.fields[KEY_COLUMN]
    }

    pub fn value(&self) -> &str {
        &self.fields[VALUE_COLUMN]
    }

    /// Key and value of an uploadable row, or the reason it is skipped.
    pub fn entry(&self) -> Result<(&str, &str), SkipReason> {
        if self.key().is_empty() {
            return Err(SkipReason::EmptyKey);
        }
        if self.value().is_empty() {
            return Err(SkipReason::EmptyValue);
        }
        Ok((self.key(), self.value()))
    }
}

/// Why a well-formed row is not submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyKey,
    EmptyValue,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyKey => write!(f, "Key is empty"),
            SkipReason::EmptyValue => write!(f, "Value is empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> ImportRow {
        ImportRow::new(1, fields.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn given_three_fields_when_entry_then_uses_first_and_third() {
        let r = row(&["k1", "ignored", "v1"]);
        assert_eq!(r.entry(), Ok(("k1", "v1")));
    }

    #[test]
    fn given_extra_columns_when_entry_then_ignores_them() {
        let r = row(&["k1", "", "v1", "extra", "more"]);
        assert_eq!(r.entry(), Ok(("k1", "v1")));
    }

    #[test]
    fn given_empty_key_and_value_when_entry_then_reports_key_first() {
        let r = row(&["", "x", ""]);
        assert_eq!(r.entry(), Err(SkipReason::EmptyKey));
    }

    #[test]
    fn given_empty_value_when_entry_then_skips() {
        let r = row(&["x", "y", ""]);
        assert_eq!(r.entry(), Err(SkipReason::EmptyValue));
    }

    #[test]
    fn given_two_fields_when_new_then_malformed() {
        let err = ImportRow::new(7, vec!["a".into(), "b".into()]).unwrap_err();
        assert!(matches!(err, DomainError::MalformedRow { line: 7, fields: 2 }));
    }

    #[test]
    fn given_fastly_item_json_when_deserialize_then_maps_key_and_value() {
        let json = r#"{"dictionary_id":"d1","item_key":"/old","item_value":"/new","service_id":"s"}"#;
        let item: DictionaryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.key, "/old");
        assert_eq!(item.value, "/new");
    }
}
