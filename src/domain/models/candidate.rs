//! Candidate work items and their per-item outcomes.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Structured metadata fields extracted from a candidate's profile sheet.
pub type FieldMap = BTreeMap<String, serde_json::Value>;

/// One candidate's unit of work: a folder of source resume documents.
///
/// Items are never persisted individually; only their aggregate effect on the
/// session counters and logs is durable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    /// Candidate key, derived from the folder name.
    pub key: String,
    /// Folder holding this candidate's resume documents.
    pub folder: PathBuf,
}

impl CandidateItem {
    pub fn new(key: impl Into<String>, folder: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            folder: folder.into(),
        }
    }
}

/// Terminal outcome of processing one item.
///
/// Outcomes travel up the call stack and are flattened into the session's
/// `summary_logs` and `errors`; they are never persisted structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// At least one phase produced a usable result.
    Success { logs: Vec<String> },
    /// No phase produced a usable result.
    Failure { error: String },
    /// The item had no qualifying input at all.
    Skipped { reason: String },
}

impl ItemOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Error record for the ledger, if this outcome carries one.
    pub fn error_record(&self, key: &str) -> Option<String> {
        match self {
            Self::Failure { error } => Some(format!("{key}: {error}")),
            _ => None,
        }
    }

    /// Flatten into summary lines for the session metadata.
    pub fn summary_lines(&self, key: &str) -> Vec<String> {
        match self {
            Self::Success { logs } => logs.clone(),
            Self::Failure { error } => vec![format!("[{key}] failed: {error}")],
            Self::Skipped { reason } => vec![format!("[{key}] skipped: {reason}")],
        }
    }
}
