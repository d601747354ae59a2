//! Ports for the external extraction collaborators.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::FieldMap;

/// Phase A collaborator: structured metadata extraction from a candidate's
/// profile sheet documents.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extract the metadata field map from the given documents. The
    /// collaborator owns persistence of the extracted content.
    async fn extract(&self, files: &[std::path::PathBuf], candidate_key: &str)
        -> DomainResult<FieldMap>;
}

/// Phase B collaborator: skill-list extraction from a candidate's free-form
/// resume documents.
#[async_trait]
pub trait SkillExtractor: Send + Sync {
    /// Extract a deduplicated skill list from the given documents. The
    /// collaborator owns persistence of the extracted content.
    async fn extract(&self, files: &[std::path::PathBuf], candidate_key: &str)
        -> DomainResult<Vec<String>>;
}

/// Store of extraction records, used only for best-effort cleanup when
/// cancellation lands after an item has already completed.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Remove all extraction records for one candidate. Returns the number of
    /// rows removed.
    async fn purge_candidate(&self, candidate_key: &str) -> DomainResult<u64>;
}
