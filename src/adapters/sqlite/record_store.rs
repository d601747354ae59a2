//! SQLite store for extracted candidate content.
//!
//! The extractor adapters upsert one row per candidate and table; the purge
//! path backs the cancellation cleanup of partially ingested candidates.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::FieldMap;
use crate::domain::ports::RecordStore;

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert_metadata(&self, candidate_key: &str, fields: &FieldMap) -> DomainResult<()> {
        let fields_json = serde_json::to_string(fields)?;
        sqlx::query(
            r"INSERT INTO candidate_metadata (candidate_key, fields, updated_at)
              VALUES (?, ?, ?)
              ON CONFLICT(candidate_key) DO UPDATE SET
                fields = excluded.fields,
                updated_at = excluded.updated_at",
        )
        .bind(candidate_key)
        .bind(&fields_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_skills(&self, candidate_key: &str, skills: &[String]) -> DomainResult<()> {
        let skills_json = serde_json::to_string(skills)?;
        sqlx::query(
            r"INSERT INTO candidate_skills (candidate_key, skills, updated_at)
              VALUES (?, ?, ?)
              ON CONFLICT(candidate_key) DO UPDATE SET
                skills = excluded.skills,
                updated_at = excluded.updated_at",
        )
        .bind(candidate_key)
        .bind(&skills_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn purge_candidate(&self, candidate_key: &str) -> DomainResult<u64> {
        let metadata = sqlx::query("DELETE FROM candidate_metadata WHERE candidate_key = ?")
            .bind(candidate_key)
            .execute(&self.pool)
            .await?;

        let skills = sqlx::query("DELETE FROM candidate_skills WHERE candidate_key = ?")
            .bind(candidate_key)
            .execute(&self.pool)
            .await?;

        Ok(metadata.rows_affected() + skills.rows_affected())
    }
}
