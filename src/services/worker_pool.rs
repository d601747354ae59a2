//! Bounded worker pool that drives items to terminal outcomes.

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CandidateItem, ItemOutcome};
use crate::services::processor::ItemProcessor;
use crate::services::stop_signal::StopSignal;

/// Called once per terminal outcome with the cumulative completed count.
///
/// `completed` is absolute and grows monotonically; completion order across
/// items is unspecified. Errors returned here are swallowed by the pool so a
/// broken observer can never affect ingestion.
#[async_trait]
pub trait ProgressObserver: Send + Sync {
    async fn on_item_done(
        &self,
        completed: usize,
        total: usize,
        key: &str,
        outcome: &ItemOutcome,
    ) -> DomainResult<()>;
}

/// Fixed-size concurrency pool. The ceiling is static configuration, not
/// elastic.
pub struct WorkerPool {
    max_workers: usize,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Process all items, respecting the concurrency ceiling and the stop
    /// signal, and return the flattened summary lines of every terminal
    /// outcome.
    ///
    /// The stop signal is polled immediately before dispatching each
    /// not-yet-started item and again after each completion; items already
    /// dispatched always run to completion. A worker panic is converted into
    /// a `Failure` outcome for that item and never cancels siblings.
    pub async fn run(
        &self,
        items: Vec<CandidateItem>,
        processor: Arc<dyn ItemProcessor>,
        stop: StopSignal,
        observer: Arc<dyn ProgressObserver>,
    ) -> DomainResult<Vec<String>> {
        let total = items.len();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<(String, ItemOutcome)>();

        // Dispatch runs as its own task so completed outcomes can be
        // aggregated (and pushed to the ledger) while later items are still
        // waiting for a worker slot.
        let dispatcher = {
            let stop = stop.clone();
            tokio::spawn(async move {
                let mut join_set: JoinSet<()> = JoinSet::new();
                let mut dispatched = 0usize;

                for item in items {
                    let Ok(permit) = semaphore.clone().acquire_owned().await else {
                        break;
                    };

                    // Checked after acquiring the slot, immediately before
                    // the item starts.
                    if stop.is_stop_requested().await {
                        info!(
                            dispatched,
                            abandoned = total - dispatched,
                            "cancellation observed; abandoning unstarted items"
                        );
                        drop(permit);
                        break;
                    }
                    let processor = Arc::clone(&processor);
                    let outcome_tx = outcome_tx.clone();

                    join_set.spawn(async move {
                        let _permit = permit;
                        let key = item.key.clone();
                        let outcome = AssertUnwindSafe(processor.process(&item))
                            .catch_unwind()
                            .await
                            .unwrap_or_else(|_| ItemOutcome::Failure {
                                error: "worker panicked while processing item".to_string(),
                            });
                        let _ = outcome_tx.send((key, outcome));
                    });
                    dispatched += 1;
                }

                // Let in-flight workers finish; dropping outcome_tx afterwards
                // ends the aggregation loop.
                while join_set.join_next().await.is_some() {}
                dispatched
            })
        };

        let mut summary = Vec::new();
        let mut completed = 0usize;

        while let Some((key, outcome)) = outcome_rx.recv().await {
            completed += 1;
            summary.extend(outcome.summary_lines(&key));

            if let Err(e) = observer
                .on_item_done(completed, total, &key, &outcome)
                .await
            {
                warn!(item = %key, error = %e, "progress observer failed; continuing");
            }

            if stop.is_stop_requested().await {
                stop.discard_partial(&key).await;
            }
        }

        let dispatched = dispatcher
            .await
            .map_err(|e| DomainError::PoolError(format!("dispatcher task failed: {e}")))?;
        debug!(dispatched, completed, total, "worker pool drained");

        Ok(summary)
    }
}
