//! Top-level supervisor for one batch-ingestion run.
//!
//! The orchestrator creates the RUNNING session, drives the worker pool, and
//! finalizes the ledger entry. It runs inside the worker process; any
//! interactive observer lives elsewhere and sees nothing but the ledger.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    CandidateItem, IngestConfig, IngestSession, ItemOutcome, SessionMetadata, SessionStatus,
};
use crate::domain::ports::{RecordStore, SessionRepository};
use crate::infrastructure::logging::RunLog;
use crate::services::processor::ItemProcessor;
use crate::services::stop_signal::StopSignal;
use crate::services::worker_pool::{ProgressObserver, WorkerPool};

pub struct IngestOrchestrator {
    sessions: Arc<dyn SessionRepository>,
    processor: Arc<dyn ItemProcessor>,
    records: Option<Arc<dyn RecordStore>>,
    config: IngestConfig,
}

impl IngestOrchestrator {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        processor: Arc<dyn ItemProcessor>,
        config: IngestConfig,
    ) -> Self {
        Self {
            sessions,
            processor,
            records: None,
            config,
        }
    }

    /// Attach the record store used for post-cancellation cleanup.
    pub fn with_record_store(mut self, records: Arc<dyn RecordStore>) -> Self {
        self.records = Some(records);
        self
    }

    /// List candidate subdirectories of the batch root, sorted by key.
    pub async fn discover_candidates(root: &Path) -> DomainResult<Vec<CandidateItem>> {
        if !root.is_dir() {
            return Err(DomainError::NotADirectory(root.display().to_string()));
        }

        let mut entries = tokio::fs::read_dir(root).await?;
        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                let key = entry.file_name().to_string_lossy().to_string();
                items.push(CandidateItem::new(key, entry.path()));
            }
        }
        items.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(items)
    }

    /// Run one batch to completion and return the session id.
    ///
    /// The batch counts as COMPLETED when it fully drains, regardless of how
    /// many individual items failed. Only an error escaping the scheduler
    /// itself marks the session FAILED. A cancellation terminal status that
    /// is already present at finalize time is never overwritten.
    pub async fn run(
        &self,
        session_id: Option<String>,
        root: &Path,
        max_workers: Option<usize>,
    ) -> DomainResult<String> {
        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let max_workers = max_workers.unwrap_or(self.config.max_workers).max(1);

        let run_log = RunLog::create(Path::new(&self.config.logs_dir), &session_id)
            .unwrap_or_else(|e| {
                warn!(error = %e, "could not create run log artifact; continuing without it");
                RunLog::disabled()
            });

        run_log.rule();
        run_log.line(&format!("INGESTION SESSION: {session_id}"));
        run_log.line(&format!("ROOT FOLDER: {}", root.display()));
        run_log.line(&format!("MAX WORKERS: {max_workers}"));
        run_log.rule();

        info!(%session_id, root = %root.display(), max_workers, "ingestion run starting");

        match self.execute(&session_id, root, max_workers, &run_log).await {
            Ok(summary) => {
                self.finish(&session_id, &summary, &run_log).await;
                Ok(session_id)
            }
            Err(e) => {
                error!(%session_id, error = %e, "ingestion run failed");
                run_log.line(&format!("Ingestion run failed: {e}"));
                self.finalize_best_effort(&session_id, SessionStatus::Failed)
                    .await;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        session_id: &str,
        root: &Path,
        max_workers: usize,
        run_log: &RunLog,
    ) -> DomainResult<Vec<String>> {
        let items = Self::discover_candidates(root).await?;

        let metadata = SessionMetadata {
            root_folder: Some(root.display().to_string()),
            max_workers: Some(max_workers),
            log_file_path: run_log.path().map(|p| p.display().to_string()),
            ..SessionMetadata::default()
        };
        let session = IngestSession::new(session_id, items.len(), metadata);

        // Ledger visibility is best-effort; a dead store must not stop the
        // batch.
        if let Err(e) = self.sessions.create(&session).await {
            warn!(%session_id, error = %e, "ledger create failed; progress will not be visible");
        }

        if items.is_empty() {
            run_log.line("No candidates found in the folder.");
            return Ok(vec!["No candidates found in the folder.".to_string()]);
        }

        let mut stop = StopSignal::new(Arc::clone(&self.sessions), session_id);
        if let Some(records) = &self.records {
            stop = stop.with_record_store(Arc::clone(records));
        }

        let observer = Arc::new(LedgerProgress {
            sessions: Arc::clone(&self.sessions),
            session_id: session_id.to_string(),
            run_log: run_log.clone(),
        });

        let pool = WorkerPool::new(max_workers);
        pool.run(items, Arc::clone(&self.processor), stop, observer)
            .await
    }

    async fn finish(&self, session_id: &str, summary: &[String], run_log: &RunLog) {
        let stopped = match self.sessions.get(session_id).await {
            Ok(Some(session)) => session.status.is_stop_requested(),
            _ => false,
        };
        if stopped {
            info!(%session_id, "ingestion stopped gracefully");
            run_log.line("Ingestion stopped gracefully.");
        } else {
            info!(%session_id, items = summary.len(), "ingestion completed");
            run_log.line("Ingestion completed.");
        }

        run_log.rule();
        run_log.line("INGESTION SUMMARY");
        run_log.rule();
        for line in summary {
            run_log.line(line);
        }

        let patch = serde_json::json!({
            "summary_logs": summary,
            "log_file_path": run_log.path().map(|p| p.display().to_string()),
        });
        if let Err(e) = self.sessions.merge_metadata(session_id, &patch).await {
            warn!(%session_id, error = %e, "failed to persist summary logs");
        }

        self.finalize_best_effort(session_id, SessionStatus::Completed)
            .await;
    }

    /// Finalize without overwriting a cancellation terminal status, logging
    /// instead of propagating ledger failures.
    async fn finalize_best_effort(&self, session_id: &str, status: SessionStatus) {
        match self.sessions.finalize(session_id, status).await {
            Ok(true) => info!(%session_id, status = %status, "session finalized"),
            Ok(false) => {
                let current = self
                    .sessions
                    .get(session_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|s| s.status.to_string());
                info!(
                    %session_id,
                    current = current.as_deref().unwrap_or("unknown"),
                    "session already terminal; leaving status untouched"
                );
            }
            Err(e) => warn!(%session_id, error = %e, "failed to finalize session"),
        }
    }
}

/// Translates pool completions into ledger updates and run-log lines.
struct LedgerProgress {
    sessions: Arc<dyn SessionRepository>,
    session_id: String,
    run_log: RunLog,
}

#[async_trait]
impl ProgressObserver for LedgerProgress {
    async fn on_item_done(
        &self,
        completed: usize,
        total: usize,
        key: &str,
        outcome: &ItemOutcome,
    ) -> DomainResult<()> {
        let state = match outcome {
            ItemOutcome::Success { .. } => "done",
            ItemOutcome::Failure { .. } => "failed",
            ItemOutcome::Skipped { .. } => "skipped",
        };
        self.run_log
            .line(&format!("[{completed}/{total}] {key}: {state}"));

        let error = outcome.error_record(key);
        self.sessions
            .update_progress(&self.session_id, completed, Some(key), error.as_deref())
            .await
    }
}
