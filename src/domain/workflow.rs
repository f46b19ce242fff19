//! Workflow states of the dictionary creator and outcomes of the bulk loader

use std::fmt;

use crate::domain::SkipReason;

/// Progress of the create-and-activate workflow.
///
/// Stages advance strictly in declaration order. Every transition either
/// reaches the next stage or aborts; `Activated` is the only success terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CreateStage {
    Start,
    VersionFetched,
    DictionaryAbsentConfirmed,
    Cloned,
    DictionaryCreated,
    Validated,
    Activated,
}

impl CreateStage {
    /// Stage reached by the next successful transition.
    pub fn next(self) -> Option<Self> {
        use CreateStage::*;
        match self {
            Start => Some(VersionFetched),
            VersionFetched => Some(DictionaryAbsentConfirmed),
            DictionaryAbsentConfirmed => Some(Cloned),
            Cloned => Some(DictionaryCreated),
            DictionaryCreated => Some(Validated),
            Validated => Some(Activated),
            Activated => None,
        }
    }

    /// Remote operation that moves the workflow out of this stage.
    pub fn pending_action(self) -> &'static str {
        use CreateStage::*;
        match self {
            Start => "fetch latest version",
            VersionFetched => "look up dictionary",
            DictionaryAbsentConfirmed => "clone version",
            Cloned => "create dictionary",
            DictionaryCreated => "validate version",
            Validated => "activate version",
            Activated => "done",
        }
    }
}

impl fmt::Display for CreateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CreateStage::Start => "start",
            CreateStage::VersionFetched => "version-fetched",
            CreateStage::DictionaryAbsentConfirmed => "dictionary-absent",
            CreateStage::Cloned => "cloned",
            CreateStage::DictionaryCreated => "dictionary-created",
            CreateStage::Validated => "validated",
            CreateStage::Activated => "activated",
        };
        f.write_str(name)
    }
}

/// Result of processing one import row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Added { key: String, value: String },
    Skipped { line: u64, reason: SkipReason },
    /// Remote service rejected the upsert, typically a duplicate key.
    Rejected { key: String, message: String },
}

/// Counters reported once the import file is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl LoadSummary {
    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Added { .. } => self.added += 1,
            RowOutcome::Skipped { .. } => self.skipped += 1,
            RowOutcome::Rejected { .. } => self.failed += 1,
        }
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} skipped, {} failed",
            self.added, self.skipped, self.failed
        )
    }
}
