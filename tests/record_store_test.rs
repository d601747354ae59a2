//! Integration tests for the candidate extraction record store.

use resume_ingest::adapters::sqlite::{
    all_embedded_migrations, create_test_pool, Migrator, SqliteRecordStore,
};
use resume_ingest::domain::models::FieldMap;
use resume_ingest::domain::ports::RecordStore;

async fn setup_store() -> SqliteRecordStore {
    let pool = create_test_pool().await.unwrap();
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .unwrap();
    SqliteRecordStore::new(pool)
}

fn sample_fields() -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("email".into(), serde_json::json!("alice@example.edu"));
    fields.insert("university".into(), serde_json::Value::Null);
    fields
}

#[tokio::test]
async fn purge_removes_both_record_kinds() {
    let store = setup_store().await;

    store.upsert_metadata("alice", &sample_fields()).await.unwrap();
    store
        .upsert_skills("alice", &["Rust".into(), "SQL".into()])
        .await
        .unwrap();

    assert_eq!(store.purge_candidate("alice").await.unwrap(), 2);
    // A second purge finds nothing left.
    assert_eq!(store.purge_candidate("alice").await.unwrap(), 0);
}

#[tokio::test]
async fn purge_touches_only_the_named_candidate() {
    let store = setup_store().await;

    store.upsert_metadata("alice", &sample_fields()).await.unwrap();
    store.upsert_metadata("bob", &sample_fields()).await.unwrap();

    assert_eq!(store.purge_candidate("alice").await.unwrap(), 1);
    assert_eq!(store.purge_candidate("bob").await.unwrap(), 1);
}

#[tokio::test]
async fn upserts_are_idempotent_per_candidate() {
    let store = setup_store().await;

    store.upsert_skills("alice", &["Rust".into()]).await.unwrap();
    store
        .upsert_skills("alice", &["Rust".into(), "Tokio".into()])
        .await
        .unwrap();

    // Still a single row per candidate and kind.
    assert_eq!(store.purge_candidate("alice").await.unwrap(), 1);
}

#[tokio::test]
async fn purging_an_unknown_candidate_is_harmless() {
    let store = setup_store().await;
    assert_eq!(store.purge_candidate("ghost").await.unwrap(), 0);
}
