//! SQLite implementation of the `SessionRepository` ledger port.
//!
//! Every mutation is a single statement: counters are written as absolute
//! values, the error list grows through `json_insert`, and metadata merges
//! through `json_patch`. Concurrent writers therefore never need a
//! read-modify-write transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{IngestSession, SessionMetadata, SessionStatus};
use crate::domain::ports::SessionRepository;

/// Advisory note stamped into `current_item` when cancellation is requested.
const STOPPING_NOTE: &str = "Stopping gracefully...";

#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: &IngestSession) -> DomainResult<()> {
        let metadata_json = serde_json::to_string(&session.metadata)?;
        let errors_json = serde_json::to_string(&session.errors)?;

        sqlx::query(
            r"INSERT INTO ingest_sessions
                (session_id, status, total_items, processed_items, current_item,
                 started_at, updated_at, metadata, errors)
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
              ON CONFLICT(session_id) DO UPDATE SET
                status = excluded.status,
                total_items = excluded.total_items,
                processed_items = excluded.processed_items,
                current_item = excluded.current_item,
                started_at = excluded.started_at,
                updated_at = excluded.updated_at,
                metadata = excluded.metadata,
                errors = excluded.errors",
        )
        .bind(&session.session_id)
        .bind(session.status.as_str())
        .bind(session.total_items as i64)
        .bind(session.processed_items as i64)
        .bind(&session.current_item)
        .bind(session.started_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .bind(&metadata_json)
        .bind(&errors_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_progress(
        &self,
        session_id: &str,
        processed_items: usize,
        current_item: Option<&str>,
        error: Option<&str>,
    ) -> DomainResult<()> {
        let now = Utc::now().to_rfc3339();

        let result = if let Some(error) = error {
            sqlx::query(
                r"UPDATE ingest_sessions
                  SET processed_items = ?, current_item = ?, updated_at = ?,
                      errors = json_insert(errors, '$[#]', ?)
                  WHERE session_id = ?",
            )
            .bind(processed_items as i64)
            .bind(current_item)
            .bind(&now)
            .bind(error)
            .bind(session_id)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r"UPDATE ingest_sessions
                  SET processed_items = ?, current_item = ?, updated_at = ?
                  WHERE session_id = ?",
            )
            .bind(processed_items as i64)
            .bind(current_item)
            .bind(&now)
            .bind(session_id)
            .execute(&self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(DomainError::SessionNotFound(session_id.to_string()));
        }
        Ok(())
    }

    async fn merge_metadata(
        &self,
        session_id: &str,
        patch: &serde_json::Value,
    ) -> DomainResult<()> {
        let patch_json = serde_json::to_string(patch)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r"UPDATE ingest_sessions
              SET metadata = json_patch(metadata, ?), updated_at = ?
              WHERE session_id = ?",
        )
        .bind(&patch_json)
        .bind(&now)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SessionNotFound(session_id.to_string()));
        }
        Ok(())
    }

    async fn finalize(&self, session_id: &str, status: SessionStatus) -> DomainResult<bool> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r"UPDATE ingest_sessions
              SET status = ?, updated_at = ?
              WHERE session_id = ? AND status = 'RUNNING'",
        )
        .bind(status.as_str())
        .bind(&now)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn request_cancel(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> DomainResult<bool> {
        if !status.is_stop_requested() {
            return Err(DomainError::InvalidStatus(status.to_string()));
        }
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r"UPDATE ingest_sessions
              SET status = ?, current_item = ?, updated_at = ?
              WHERE session_id = ? AND status = 'RUNNING'",
        )
        .bind(status.as_str())
        .bind(STOPPING_NOTE)
        .bind(&now)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, session_id: &str) -> DomainResult<Option<IngestSession>> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT session_id, status, total_items, processed_items, current_item,
                    started_at, updated_at, metadata, errors
             FROM ingest_sessions WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(IngestSession::try_from).transpose()
    }

    async fn list_active(&self) -> DomainResult<Vec<IngestSession>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT session_id, status, total_items, processed_items, current_item,
                    started_at, updated_at, metadata, errors
             FROM ingest_sessions WHERE status = 'RUNNING'
             ORDER BY started_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(IngestSession::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    status: String,
    total_items: i64,
    processed_items: i64,
    current_item: Option<String>,
    started_at: String,
    updated_at: String,
    metadata: String,
    errors: String,
}

impl TryFrom<SessionRow> for IngestSession {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let metadata: SessionMetadata = serde_json::from_str(&row.metadata)?;
        let errors: Vec<String> = serde_json::from_str(&row.errors)?;

        Ok(IngestSession {
            session_id: row.session_id,
            status: SessionStatus::parse(&row.status)?,
            total_items: row.total_items.max(0) as usize,
            processed_items: row.processed_items.max(0) as usize,
            current_item: row.current_item,
            started_at: parse_datetime(&row.started_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
            metadata,
            errors,
        })
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::SerializationError(format!("invalid timestamp {value:?}: {e}")))
}
