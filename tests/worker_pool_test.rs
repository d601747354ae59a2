//! Scheduling tests for the bounded worker pool.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{make_items, setup_sessions, CancelAfter, RecordingObserver, ScriptedProcessor};
use resume_ingest::domain::models::{IngestSession, SessionMetadata, SessionStatus};
use resume_ingest::domain::ports::SessionRepository;
use resume_ingest::services::{StopSignal, WorkerPool};

async fn running_session(
    repo: &Arc<resume_ingest::adapters::sqlite::SqliteSessionRepository>,
    id: &str,
    total: usize,
) {
    repo.create(&IngestSession::new(id, total, SessionMetadata::default()))
        .await
        .unwrap();
}

#[tokio::test]
async fn drains_all_items_and_reports_each_once() {
    let repo = setup_sessions().await;
    running_session(&repo, "s1", 5).await;

    let processor = Arc::new(ScriptedProcessor::new(Duration::from_millis(5)));
    let observer = Arc::new(RecordingObserver::new());
    let pool = WorkerPool::new(3);

    let summary = pool
        .run(
            make_items(5),
            processor.clone(),
            StopSignal::new(repo.clone(), "s1"),
            observer.clone(),
        )
        .await
        .unwrap();

    assert_eq!(summary.len(), 5);
    let calls = observer.observed();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls.last().unwrap().completed, 5);
    assert!(calls.iter().all(|c| c.total == 5));
}

#[tokio::test]
async fn completed_count_grows_monotonically() {
    let repo = setup_sessions().await;
    running_session(&repo, "s1", 8).await;

    let processor = Arc::new(ScriptedProcessor::new(Duration::from_millis(3)));
    let observer = Arc::new(RecordingObserver::new());
    let pool = WorkerPool::new(4);

    pool.run(
        make_items(8),
        processor,
        StopSignal::new(repo.clone(), "s1"),
        observer.clone(),
    )
    .await
    .unwrap();

    let calls = observer.observed();
    for (i, call) in calls.iter().enumerate() {
        assert_eq!(call.completed, i + 1);
    }
}

#[tokio::test]
async fn one_failing_item_never_disturbs_siblings() {
    let repo = setup_sessions().await;
    running_session(&repo, "s1", 3).await;

    let processor =
        Arc::new(ScriptedProcessor::new(Duration::from_millis(5)).failing_on(&["item-01"]));
    let observer = Arc::new(RecordingObserver::new());
    let pool = WorkerPool::new(2);

    let summary = pool
        .run(
            make_items(3),
            processor.clone(),
            StopSignal::new(repo.clone(), "s1"),
            observer.clone(),
        )
        .await
        .unwrap();

    let calls = observer.observed();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls.iter().filter(|c| c.failed).count(), 1);
    assert!(summary.iter().any(|l| l.contains("[item-01] failed")));
    assert_eq!(summary.iter().filter(|l| l.contains("ingested")).count(), 2);
}

#[tokio::test]
async fn never_runs_more_items_than_the_ceiling() {
    let repo = setup_sessions().await;
    running_session(&repo, "s1", 10).await;

    let processor = Arc::new(ScriptedProcessor::new(Duration::from_millis(20)));
    let observer = Arc::new(RecordingObserver::new());
    let pool = WorkerPool::new(2);

    pool.run(
        make_items(10),
        processor.clone(),
        StopSignal::new(repo.clone(), "s1"),
        observer,
    )
    .await
    .unwrap();

    assert!(processor.max_in_flight.load(Ordering::SeqCst) <= 2);
    assert_eq!(processor.attempted_keys().len(), 10);
}

#[tokio::test]
async fn observer_failures_are_swallowed() {
    let repo = setup_sessions().await;
    running_session(&repo, "s1", 4).await;

    let processor = Arc::new(ScriptedProcessor::new(Duration::from_millis(2)));
    let observer = Arc::new(RecordingObserver::failing());
    let pool = WorkerPool::new(2);

    let summary = pool
        .run(
            make_items(4),
            processor,
            StopSignal::new(repo.clone(), "s1"),
            observer.clone(),
        )
        .await
        .unwrap();

    // The run drained fully despite every callback erroring.
    assert_eq!(summary.len(), 4);
    assert_eq!(observer.observed().len(), 4);
}

#[tokio::test]
async fn cancellation_lets_in_flight_items_finish_and_abandons_the_rest() {
    let repo = setup_sessions().await;
    running_session(&repo, "s1", 10).await;

    let processor = Arc::new(
        ScriptedProcessor::new(Duration::from_millis(25)).cancelling_after(CancelAfter {
            sessions: repo.clone(),
            session_id: "s1".to_string(),
            status: SessionStatus::Abandoned,
            after: 4,
        }),
    );
    let observer = Arc::new(RecordingObserver::new());
    let pool = WorkerPool::new(2);

    pool.run(
        make_items(10),
        processor.clone(),
        StopSignal::new(repo.clone(), "s1"),
        observer.clone(),
    )
    .await
    .unwrap();

    let completed = observer.observed().len();
    let attempted = processor.attempted_keys().len();

    // Everything dispatched before the stop landed runs to completion; with
    // a pool of 2 that is at most two items beyond the four that triggered
    // the cancel. Nothing else is ever attempted.
    assert!((4..=6).contains(&completed), "completed = {completed}");
    assert!(attempted <= 6, "attempted = {attempted}");
    assert_eq!(completed, attempted);
}

#[tokio::test]
async fn empty_batch_drains_immediately() {
    let repo = setup_sessions().await;
    running_session(&repo, "s1", 0).await;

    let processor = Arc::new(ScriptedProcessor::new(Duration::from_millis(1)));
    let observer = Arc::new(RecordingObserver::new());
    let pool = WorkerPool::new(4);

    let summary = pool
        .run(
            Vec::new(),
            processor,
            StopSignal::new(repo.clone(), "s1"),
            observer.clone(),
        )
        .await
        .unwrap();

    assert!(summary.is_empty());
    assert!(observer.observed().is_empty());
}
