//! Repository port for the durable session ledger.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{IngestSession, SessionStatus};

/// Durable record of a batch run's progress.
///
/// The ledger is the sole channel between the worker process and any
/// observer. Writers never read-modify-write: counters arrive as absolute
/// values and list/map columns are appended or merged in single statements,
/// so concurrent writers cannot lose updates.
///
/// Ledger I/O failures degrade visibility only; callers are expected to log
/// locally and keep processing.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a session with upsert semantics. Calling `create` twice with
    /// the same id resets the existing row rather than creating a duplicate.
    async fn create(&self, session: &IngestSession) -> DomainResult<()>;

    /// Write absolute progress counters, stamp `updated_at`, and append
    /// `error` to the error list when present.
    async fn update_progress(
        &self,
        session_id: &str,
        processed_items: usize,
        current_item: Option<&str>,
        error: Option<&str>,
    ) -> DomainResult<()>;

    /// Merge a JSON patch into the session metadata map.
    async fn merge_metadata(
        &self,
        session_id: &str,
        patch: &serde_json::Value,
    ) -> DomainResult<()>;

    /// Move a RUNNING session to a terminal status. Returns `false` when the
    /// session had already left RUNNING, in which case the existing terminal
    /// status is preserved.
    async fn finalize(&self, session_id: &str, status: SessionStatus) -> DomainResult<bool>;

    /// Request cooperative cancellation of a RUNNING session by setting the
    /// cancellation status and stamping an advisory stopping note. Returns
    /// `false` when the session was not RUNNING. Does not signal the worker
    /// process directly; the worker polls.
    async fn request_cancel(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> DomainResult<bool>;

    /// Fetch one session.
    async fn get(&self, session_id: &str) -> DomainResult<Option<IngestSession>>;

    /// List sessions currently RUNNING, newest first.
    async fn list_active(&self) -> DomainResult<Vec<IngestSession>>;
}
