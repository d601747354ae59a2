//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use resume_ingest::adapters::sqlite::{
    all_embedded_migrations, create_test_pool, Migrator, SqliteSessionRepository,
};
use resume_ingest::domain::errors::{DomainError, DomainResult};
use resume_ingest::domain::models::{CandidateItem, ItemOutcome, SessionStatus};
use resume_ingest::domain::ports::SessionRepository;
use resume_ingest::services::{ItemProcessor, ProgressObserver};

/// In-memory ledger repository with the schema applied.
pub async fn setup_sessions() -> Arc<SqliteSessionRepository> {
    let pool = create_test_pool().await.unwrap();
    let migrator = Migrator::new(pool.clone());
    migrator
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .unwrap();
    Arc::new(SqliteSessionRepository::new(pool))
}

/// Items named `item-00`, `item-01`, ... with no backing folders; scripted
/// processors never touch the filesystem.
pub fn make_items(count: usize) -> Vec<CandidateItem> {
    (0..count)
        .map(|i| CandidateItem::new(format!("item-{i:02}"), format!("/virtual/item-{i:02}")))
        .collect()
}

/// Batch root with one subdirectory per candidate key.
pub fn make_batch_dir(keys: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for key in keys {
        std::fs::create_dir(dir.path().join(key)).unwrap();
    }
    dir
}

/// Requests cancellation through the ledger once a given number of items has
/// been processed.
pub struct CancelAfter {
    pub sessions: Arc<dyn SessionRepository>,
    pub session_id: String,
    pub status: SessionStatus,
    pub after: usize,
}

/// Deterministic `ItemProcessor` for scheduling tests.
///
/// Tracks which items were attempted and how many ran concurrently; outcomes
/// are controlled by `fail_keys` / `skip_keys`.
pub struct ScriptedProcessor {
    pub delay: Duration,
    pub fail_keys: HashSet<String>,
    pub skip_keys: HashSet<String>,
    pub attempted: Mutex<Vec<String>>,
    pub completed: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub cancel_after: Option<CancelAfter>,
}

impl ScriptedProcessor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail_keys: HashSet::new(),
            skip_keys: HashSet::new(),
            attempted: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    pub fn failing_on(mut self, keys: &[&str]) -> Self {
        self.fail_keys = keys.iter().map(|k| (*k).to_string()).collect();
        self
    }

    pub fn skipping(mut self, keys: &[&str]) -> Self {
        self.skip_keys = keys.iter().map(|k| (*k).to_string()).collect();
        self
    }

    pub fn cancelling_after(mut self, cancel: CancelAfter) -> Self {
        self.cancel_after = Some(cancel);
        self
    }

    pub fn attempted_keys(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItemProcessor for ScriptedProcessor {
    async fn process(&self, item: &CandidateItem) -> ItemOutcome {
        self.attempted.lock().unwrap().push(item.key.clone());

        let now_running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_running, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(cancel) = &self.cancel_after {
            if done == cancel.after {
                let _ = cancel
                    .sessions
                    .request_cancel(&cancel.session_id, cancel.status)
                    .await;
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_keys.contains(&item.key) {
            ItemOutcome::Failure {
                error: "extraction blew up".to_string(),
            }
        } else if self.skip_keys.contains(&item.key) {
            ItemOutcome::Skipped {
                reason: "no resume files found".to_string(),
            }
        } else {
            ItemOutcome::Success {
                logs: vec![format!("[{}] ingested", item.key)],
            }
        }
    }
}

/// One observed completion callback.
#[derive(Debug, Clone)]
pub struct ObservedCall {
    pub completed: usize,
    pub total: usize,
    pub key: String,
    pub failed: bool,
}

/// `ProgressObserver` that records every callback; optionally errors to
/// exercise the swallow path.
pub struct RecordingObserver {
    pub calls: Mutex<Vec<ObservedCall>>,
    pub fail: bool,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn observed(&self) -> Vec<ObservedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressObserver for RecordingObserver {
    async fn on_item_done(
        &self,
        completed: usize,
        total: usize,
        key: &str,
        outcome: &ItemOutcome,
    ) -> DomainResult<()> {
        self.calls.lock().unwrap().push(ObservedCall {
            completed,
            total,
            key: key.to_string(),
            failed: outcome.is_failure(),
        });
        if self.fail {
            return Err(DomainError::DatabaseError("observer offline".to_string()));
        }
        Ok(())
    }
}
