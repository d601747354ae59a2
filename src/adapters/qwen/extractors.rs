//! Metadata and skill extractors backed by the vision-model endpoint.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::adapters::qwen::QwenVlClient;
use crate::adapters::sqlite::SqliteRecordStore;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::FieldMap;
use crate::domain::ports::{MetadataExtractor, SkillExtractor};

const METADATA_SYSTEM_PROMPT: &str = "You are a JSON-extractor assistant.";
const SKILLS_SYSTEM_PROMPT: &str = "You are an expert at parsing resumes.";

/// Field names of the structured profile-sheet contract.
const METADATA_FIELDS: [&str; 10] = [
    "email",
    "from_date",
    "to_date",
    "work_duration_category",
    "university",
    "applied_position",
    "salary",
    "part_or_full",
    "is_credit_bearing",
    "citizenship",
];

fn metadata_prompt(document_text: &str) -> String {
    format!(
        "You are given the text of a candidate's internship application form. \
         Locate the JOB APPLICATION section if it exists. Extract exactly the \
         following fields and return precisely one JSON object (no extra text): \
         email, from_date, to_date (the FIRST complete range under 'Intended \
         Internship Period'), work_duration_category, university, \
         applied_position, salary (under 'School Recommended Internship Fee'), \
         part_or_full (FULLTIME or PARTTIME), is_credit_bearing (YES or NO), \
         citizenship (CITIZEN, PR or FOREIGNER). Set any missing field to null \
         and do not return extra keys.\n\nDocument text:\n{document_text}"
    )
}

fn skills_prompt(document_text: &str) -> String {
    format!(
        "Extract every skill mentioned in this resume and reply with a single \
         JSON array of short skill strings, nothing else.\n\n\
         Document text:\n{document_text}"
    )
}

/// Phase A collaborator: profile-sheet metadata extraction.
pub struct QwenMetadataExtractor {
    client: QwenVlClient,
    store: SqliteRecordStore,
}

impl QwenMetadataExtractor {
    pub fn new(client: QwenVlClient, store: SqliteRecordStore) -> Self {
        Self { client, store }
    }
}

#[async_trait]
impl MetadataExtractor for QwenMetadataExtractor {
    async fn extract(&self, files: &[PathBuf], candidate_key: &str) -> DomainResult<FieldMap> {
        let text = read_documents_text(files, candidate_key).await?;
        let reply = self
            .client
            .chat(METADATA_SYSTEM_PROMPT, &metadata_prompt(&text))
            .await?;

        let value = parse_json_reply(&reply)?;
        let object = value.as_object().ok_or_else(|| {
            DomainError::ExtractionFailed("model reply is not a JSON object".to_string())
        })?;

        // Normalize to the known field contract; unknown keys are dropped.
        let mut fields = FieldMap::new();
        for name in METADATA_FIELDS {
            fields.insert(
                name.to_string(),
                object.get(name).cloned().unwrap_or(serde_json::Value::Null),
            );
        }
        debug!(candidate_key, field_count = fields.len(), "metadata extracted");

        self.store.upsert_metadata(candidate_key, &fields).await?;
        Ok(fields)
    }
}

/// Phase B collaborator: free-form resume skill extraction.
pub struct QwenSkillExtractor {
    client: QwenVlClient,
    store: SqliteRecordStore,
}

impl QwenSkillExtractor {
    pub fn new(client: QwenVlClient, store: SqliteRecordStore) -> Self {
        Self { client, store }
    }
}

#[async_trait]
impl SkillExtractor for QwenSkillExtractor {
    async fn extract(&self, files: &[PathBuf], candidate_key: &str) -> DomainResult<Vec<String>> {
        let text = read_documents_text(files, candidate_key).await?;
        let reply = self
            .client
            .chat(SKILLS_SYSTEM_PROMPT, &skills_prompt(&text))
            .await?;

        let skills = parse_skill_reply(&reply);
        if skills.is_empty() {
            return Err(DomainError::ExtractionFailed(
                "model reply contained no skills".to_string(),
            ));
        }
        debug!(candidate_key, skill_count = skills.len(), "skills extracted");

        self.store.upsert_skills(candidate_key, &skills).await?;
        Ok(skills)
    }
}

/// Concatenate the extractable text of the given documents.
///
/// PDF text extraction is synchronous, so it runs on the blocking pool.
/// Documents that yield no text are skipped with a warning; the call fails
/// only when nothing at all could be read.
async fn read_documents_text(files: &[PathBuf], candidate_key: &str) -> DomainResult<String> {
    let mut parts = Vec::new();

    for file in files {
        let path = file.clone();
        let extracted = tokio::task::spawn_blocking(move || extract_file_text(&path))
            .await
            .map_err(|e| DomainError::ExtractionFailed(format!("text extraction task: {e}")))?;

        match extracted {
            Ok(text) if !text.trim().is_empty() => parts.push(text),
            Ok(_) => warn!(candidate_key, file = %file.display(), "document yielded no text"),
            Err(e) => warn!(candidate_key, file = %file.display(), error = %e, "unreadable document"),
        }
    }

    if parts.is_empty() {
        return Err(DomainError::ExtractionFailed(format!(
            "no readable text in {} document(s)",
            files.len()
        )));
    }
    Ok(parts.join("\n"))
}

fn extract_file_text(path: &std::path::Path) -> Result<String, String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => {
            pdf_extract::extract_text(path).map_err(|e| e.to_string())
        }
        other => Err(format!("unsupported document type: {other:?}")),
    }
}

/// Extract the first JSON payload from a model reply, tolerating Markdown
/// code fences and prose around it.
fn parse_json_reply(reply: &str) -> DomainResult<serde_json::Value> {
    let cleaned: String = reply
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");

    let trimmed = cleaned.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    // Fall back to the outermost object or array slice.
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }

    Err(DomainError::ExtractionFailed(
        "no JSON payload found in model reply".to_string(),
    ))
}

/// Parse a skill reply: a JSON array when the model cooperates, a
/// comma-separated fallback when it does not. Deduplicates preserving order.
fn parse_skill_reply(reply: &str) -> Vec<String> {
    let raw: Vec<String> = match parse_json_reply(reply) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => reply.split(',').map(str::to_string).collect(),
    };

    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_object() {
        let value = parse_json_reply(r#"{"email": "a@b.c"}"#).unwrap();
        assert_eq!(value["email"], "a@b.c");
    }

    #[test]
    fn strips_markdown_fences() {
        let reply = "```json\n{\"email\": null}\n```";
        let value = parse_json_reply(reply).unwrap();
        assert!(value["email"].is_null());
    }

    #[test]
    fn recovers_object_embedded_in_prose() {
        let reply = "Here is the result: {\"salary\": \"$1500\"} hope that helps";
        let value = parse_json_reply(reply).unwrap();
        assert_eq!(value["salary"], "$1500");
    }

    #[test]
    fn rejects_reply_without_json() {
        assert!(parse_json_reply("no structured data here").is_err());
    }

    #[test]
    fn skill_reply_deduplicates_case_insensitively() {
        let skills = parse_skill_reply(r#"["Rust", "SQL", "rust", " Python "]"#);
        assert_eq!(skills, vec!["Rust", "SQL", "Python"]);
    }

    #[test]
    fn skill_reply_falls_back_to_comma_split() {
        let skills = parse_skill_reply("Rust, SQL, Python");
        assert_eq!(skills, vec!["Rust", "SQL", "Python"]);
    }
}
