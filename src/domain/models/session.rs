//! Ingestion session domain model.
//!
//! A session is one batch-ingestion run. Its row in the ledger is the only
//! state shared between the worker process and any observer; both sides poll
//! and mutate it through `SessionRepository`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Status of an ingestion session.
///
/// A session leaves `Running` exactly once and never re-enters it. The four
/// non-running statuses are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// The worker process is (or should be) processing items.
    Running,
    /// The batch drained normally, regardless of per-item failures.
    Completed,
    /// The scheduler itself failed; the batch did not drain.
    Failed,
    /// An operator requested cancellation.
    Abandoned,
    /// The session was archived, either after completion or as a forced stop.
    Archived,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Abandoned => "ABANDONED",
            Self::Archived => "ARCHIVED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.to_uppercase().as_str() {
            "RUNNING" => Ok(Self::Running),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            "ABANDONED" => Ok(Self::Abandoned),
            "ARCHIVED" => Ok(Self::Archived),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Check if this status signals cooperative cancellation to the worker.
    pub fn is_stop_requested(&self) -> bool {
        matches!(self, Self::Abandoned | Self::Archived)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form session metadata persisted as a JSON map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Root folder the batch was submitted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<String>,

    /// Worker pool ceiling the batch was submitted with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,

    /// Flattened per-item outcome lines, written at finalize time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary_logs: Vec<String>,

    /// Path to the detailed append-only run log artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,

    /// Anything else an external writer has merged into the map.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One batch-ingestion run, as persisted in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSession {
    pub session_id: String,
    pub status: SessionStatus,
    pub total_items: usize,
    pub processed_items: usize,
    /// Advisory only: last item any worker reported, not necessarily the
    /// slowest in-flight one.
    pub current_item: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metadata: SessionMetadata,
    /// Append-only item-level error records.
    pub errors: Vec<String>,
}

impl IngestSession {
    /// Create a new running session.
    pub fn new(
        session_id: impl Into<String>,
        total_items: usize,
        metadata: SessionMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            status: SessionStatus::Running,
            total_items,
            processed_items: 0,
            current_item: None,
            started_at: now,
            updated_at: now,
            metadata,
            errors: Vec::new(),
        }
    }

    /// Fraction of the batch that has reached a terminal outcome.
    pub fn progress_fraction(&self) -> f64 {
        if self.total_items == 0 {
            return 1.0;
        }
        self.processed_items as f64 / self.total_items as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            SessionStatus::Running,
            SessionStatus::Completed,
            SessionStatus::Failed,
            SessionStatus::Abandoned,
            SessionStatus::Archived,
        ] {
            assert_eq!(SessionStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(SessionStatus::parse("PAUSED").is_err());
    }

    #[test]
    fn only_running_is_non_terminal() {
        assert!(!SessionStatus::Running.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(SessionStatus::Abandoned.is_terminal());
        assert!(SessionStatus::Archived.is_terminal());
    }

    #[test]
    fn stop_is_requested_only_by_cancellation_statuses() {
        assert!(SessionStatus::Abandoned.is_stop_requested());
        assert!(SessionStatus::Archived.is_stop_requested());
        assert!(!SessionStatus::Running.is_stop_requested());
        assert!(!SessionStatus::Completed.is_stop_requested());
        assert!(!SessionStatus::Failed.is_stop_requested());
    }

    #[test]
    fn new_session_starts_running_with_zero_progress() {
        let session = IngestSession::new("s1", 5, SessionMetadata::default());
        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(session.processed_items, 0);
        assert_eq!(session.total_items, 5);
        assert!(session.updated_at >= session.started_at);
    }

    #[test]
    fn empty_batch_reports_full_progress() {
        let session = IngestSession::new("s1", 0, SessionMetadata::default());
        assert!((session.progress_fraction() - 1.0).abs() < f64::EPSILON);
    }
}
