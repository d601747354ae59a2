//! Per-item processing: the two extraction phases for one candidate.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::domain::models::{CandidateItem, IngestConfig, ItemOutcome};
use crate::domain::ports::{MetadataExtractor, SkillExtractor};

/// Processes one work item to a terminal outcome. Implementations must never
/// let a collaborator failure escape as anything other than a `Failure`
/// outcome; sibling items depend on that isolation.
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    async fn process(&self, item: &CandidateItem) -> ItemOutcome;
}

/// Runs phase A (profile-sheet metadata) and phase B (free-form skills)
/// sequentially for one candidate folder.
///
/// A phase with no qualifying input is skipped with a warning. A phase whose
/// collaborator errors is downgraded to a warning as long as the other phase
/// produced a usable result; the item fails only when no phase did.
pub struct CandidateProcessor {
    metadata: Arc<dyn MetadataExtractor>,
    skills: Arc<dyn SkillExtractor>,
    metadata_marker: String,
    resume_extensions: Vec<String>,
}

impl CandidateProcessor {
    pub fn new(
        metadata: Arc<dyn MetadataExtractor>,
        skills: Arc<dyn SkillExtractor>,
        config: &IngestConfig,
    ) -> Self {
        Self {
            metadata,
            skills,
            metadata_marker: config.metadata_marker.to_lowercase(),
            resume_extensions: config
                .resume_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    fn is_resume_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.resume_extensions.iter().any(|known| known == &e.to_lowercase()))
            .unwrap_or(false)
    }

    fn has_marker(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().to_lowercase().contains(&self.metadata_marker))
            .unwrap_or(false)
    }

    async fn discover_files(&self, folder: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(folder).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && self.is_resume_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl ItemProcessor for CandidateProcessor {
    async fn process(&self, item: &CandidateItem) -> ItemOutcome {
        let key = &item.key;

        let files = match self.discover_files(&item.folder).await {
            Ok(files) => files,
            Err(e) => {
                return ItemOutcome::Failure {
                    error: format!("cannot read candidate folder: {e}"),
                }
            }
        };
        if files.is_empty() {
            warn!(candidate = %key, "no resume files found, skipping");
            return ItemOutcome::Skipped {
                reason: "no resume files found".to_string(),
            };
        }

        let (profile_sheets, resumes): (Vec<PathBuf>, Vec<PathBuf>) =
            files.into_iter().partition(|f| self.has_marker(f));

        let mut logs = Vec::new();
        let mut phase_errors = Vec::new();
        let mut usable = false;

        // Phase A: structured metadata from profile sheets.
        if profile_sheets.is_empty() {
            warn!(candidate = %key, marker = %self.metadata_marker, "no profile sheet found");
            logs.push(format!("[{key}] no profile sheet found; metadata phase skipped"));
        } else {
            match self.metadata.extract(&profile_sheets, key).await {
                Ok(fields) => {
                    let filled = fields.values().filter(|v| !v.is_null()).count();
                    logs.push(format!(
                        "[{key}] metadata extracted ({filled}/{} fields)",
                        fields.len()
                    ));
                    usable = true;
                }
                Err(e) => phase_errors.push(format!("metadata phase: {e}")),
            }
        }

        // Phase B: skill list from free-form resumes. Runs even when phase A
        // errored.
        if resumes.is_empty() {
            warn!(candidate = %key, "no free-form resume found");
            logs.push(format!("[{key}] no free-form resume found; skill phase skipped"));
        } else {
            match self.skills.extract(&resumes, key).await {
                Ok(skills) => {
                    logs.push(format!("[{key}] skills extracted ({} skills)", skills.len()));
                    usable = true;
                }
                Err(e) => phase_errors.push(format!("skill phase: {e}")),
            }
        }

        if !usable && !phase_errors.is_empty() {
            return ItemOutcome::Failure {
                error: phase_errors.join("; "),
            };
        }

        for phase_error in phase_errors {
            logs.push(format!("[{key}] warning: {phase_error}"));
        }
        ItemOutcome::Success { logs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{DomainError, DomainResult};
    use crate::domain::models::FieldMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubMetadata {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataExtractor for StubMetadata {
        async fn extract(&self, _files: &[PathBuf], _key: &str) -> DomainResult<FieldMap> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::ExtractionFailed("model unreachable".into()));
            }
            let mut fields = FieldMap::new();
            fields.insert("email".into(), serde_json::json!("a@b.c"));
            Ok(fields)
        }
    }

    struct StubSkills {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SkillExtractor for StubSkills {
        async fn extract(&self, _files: &[PathBuf], _key: &str) -> DomainResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::ExtractionFailed("model unreachable".into()));
            }
            Ok(vec!["Rust".into()])
        }
    }

    fn processor(
        metadata_fail: bool,
        skills_fail: bool,
    ) -> (CandidateProcessor, Arc<StubMetadata>, Arc<StubSkills>) {
        let metadata = Arc::new(StubMetadata { fail: metadata_fail, calls: AtomicUsize::new(0) });
        let skills = Arc::new(StubSkills { fail: skills_fail, calls: AtomicUsize::new(0) });
        let processor = CandidateProcessor::new(
            metadata.clone(),
            skills.clone(),
            &IngestConfig::default(),
        );
        (processor, metadata, skills)
    }

    fn candidate_folder(files: &[&str]) -> (tempfile::TempDir, CandidateItem) {
        let dir = tempfile::tempdir().unwrap();
        for name in files {
            std::fs::write(dir.path().join(name), b"stub").unwrap();
        }
        let item = CandidateItem::new("alice", dir.path());
        (dir, item)
    }

    #[tokio::test]
    async fn empty_folder_is_skipped() {
        let (processor, metadata, skills) = processor(false, false);
        let (_dir, item) = candidate_folder(&["notes.txt"]);

        let outcome = processor.process(&item).await;
        assert!(matches!(outcome, ItemOutcome::Skipped { .. }));
        assert_eq!(metadata.calls.load(Ordering::SeqCst), 0);
        assert_eq!(skills.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn both_phases_run_for_a_complete_folder() {
        let (processor, metadata, skills) = processor(false, false);
        let (_dir, item) = candidate_folder(&["alice_mikomiko.pdf", "alice_resume.pdf"]);

        let outcome = processor.process(&item).await;
        match outcome {
            ItemOutcome::Success { logs } => assert_eq!(logs.len(), 2),
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(metadata.calls.load(Ordering::SeqCst), 1);
        assert_eq!(skills.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_profile_sheet_skips_phase_a_with_warning() {
        let (processor, metadata, skills) = processor(false, false);
        let (_dir, item) = candidate_folder(&["alice_resume.pdf"]);

        let outcome = processor.process(&item).await;
        match outcome {
            ItemOutcome::Success { logs } => {
                assert!(logs[0].contains("metadata phase skipped"));
                assert!(logs[1].contains("skills extracted"));
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(metadata.calls.load(Ordering::SeqCst), 0);
        assert_eq!(skills.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn one_failed_phase_still_succeeds_with_warning() {
        let (processor, _metadata, skills) = processor(true, false);
        let (_dir, item) = candidate_folder(&["alice_mikomiko.pdf", "alice_resume.pdf"]);

        let outcome = processor.process(&item).await;
        match outcome {
            ItemOutcome::Success { logs } => {
                assert!(logs.iter().any(|l| l.contains("warning: metadata phase")));
            }
            other => panic!("expected success, got {other:?}"),
        }
        // Phase B still ran despite phase A's failure.
        assert_eq!(skills.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn item_fails_only_when_no_phase_is_usable() {
        let (processor, ..) = processor(true, true);
        let (_dir, item) = candidate_folder(&["alice_mikomiko.pdf", "alice_resume.pdf"]);

        let outcome = processor.process(&item).await;
        match outcome {
            ItemOutcome::Failure { error } => {
                assert!(error.contains("metadata phase"));
                assert!(error.contains("skill phase"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_phase_with_no_other_input_fails_the_item() {
        let (processor, ..) = processor(false, true);
        let (_dir, item) = candidate_folder(&["alice_resume.pdf"]);

        let outcome = processor.process(&item).await;
        assert!(matches!(outcome, ItemOutcome::Failure { .. }));
    }

    #[tokio::test]
    async fn unreadable_folder_is_a_failure() {
        let (processor, ..) = processor(false, false);
        let item = CandidateItem::new("ghost", "/nonexistent/path/for/sure");

        let outcome = processor.process(&item).await;
        assert!(matches!(outcome, ItemOutcome::Failure { .. }));
    }
}
