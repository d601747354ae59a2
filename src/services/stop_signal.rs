//! Cooperative, poll-based cancellation derived from the session ledger.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::ports::{RecordStore, SessionRepository};

/// Stop signal for one session.
///
/// There is no preemption: the scheduler polls this between dispatches and
/// after completions, so stop latency is bounded by the slowest in-flight
/// item. A ledger read failure is treated as "keep going", matching the
/// best-effort visibility contract of the ledger.
#[derive(Clone)]
pub struct StopSignal {
    sessions: Arc<dyn SessionRepository>,
    session_id: String,
    records: Option<Arc<dyn RecordStore>>,
}

impl StopSignal {
    pub fn new(sessions: Arc<dyn SessionRepository>, session_id: impl Into<String>) -> Self {
        Self {
            sessions,
            session_id: session_id.into(),
            records: None,
        }
    }

    /// Attach the record store used for post-cancellation cleanup.
    pub fn with_record_store(mut self, records: Arc<dyn RecordStore>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// True iff the session status has been flipped to a cancellation state.
    pub async fn is_stop_requested(&self) -> bool {
        match self.sessions.get(&self.session_id).await {
            Ok(Some(session)) if session.status.is_stop_requested() => {
                info!(
                    session_id = %self.session_id,
                    status = %session.status,
                    "stop signal detected"
                );
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(
                    session_id = %self.session_id,
                    error = %e,
                    "error checking stop signal"
                );
                false
            }
        }
    }

    /// Best-effort removal of an item's partial extraction records after
    /// cancellation landed. Failures are logged and never escalated; they
    /// must not block the cancellation itself.
    pub async fn discard_partial(&self, candidate_key: &str) {
        let Some(records) = &self.records else {
            return;
        };
        match records.purge_candidate(candidate_key).await {
            Ok(rows) => info!(
                candidate = %candidate_key,
                rows,
                "discarded partial records after cancellation"
            ),
            Err(e) => warn!(
                candidate = %candidate_key,
                error = %e,
                "cleanup of partial records failed"
            ),
        }
    }
}
