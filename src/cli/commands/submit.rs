//! Implementation of the `resume-ingest submit` command.
//!
//! Submit is fire-and-forget: it creates the session row, spawns a detached
//! worker process, and returns. From that point the ledger row is the only
//! link between this terminal and the run.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::process::Stdio;
use uuid::Uuid;

use crate::cli::context::CliContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{IngestSession, SessionMetadata};
use crate::domain::ports::SessionRepository;
use crate::services::IngestOrchestrator;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Root folder containing one subdirectory per candidate
    pub folder: PathBuf,

    /// Worker pool ceiling for this batch (defaults to configuration)
    #[arg(short, long)]
    pub max_workers: Option<usize>,
}

#[derive(Debug, serde::Serialize)]
pub struct SubmitOutput {
    pub session_id: String,
    pub folder: String,
    pub total_items: usize,
    pub max_workers: usize,
}

impl CommandOutput for SubmitOutput {
    fn to_human(&self) -> String {
        format!(
            "Ingestion started.\n  Session ID: {}\n  Folder: {}\n  Candidates: {}\n  Workers: {}\n\n\
             Progress continues in the background; check it with\n  resume-ingest status {}",
            self.session_id, self.folder, self.total_items, self.max_workers, self.session_id
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SubmitArgs, json_mode: bool) -> Result<()> {
    let ctx = CliContext::init().await?;

    let folder = args
        .folder
        .canonicalize()
        .with_context(|| format!("Folder not found: {}", args.folder.display()))?;
    let items = IngestOrchestrator::discover_candidates(&folder)
        .await
        .context("Failed to scan batch folder")?;

    let max_workers = args.max_workers.unwrap_or(ctx.config.ingest.max_workers).max(1);
    let session_id = Uuid::new_v4().to_string();

    // Create the row before spawning so the session is queryable the moment
    // submit returns. The worker re-creates it with upsert semantics.
    let metadata = SessionMetadata {
        root_folder: Some(folder.display().to_string()),
        max_workers: Some(max_workers),
        ..SessionMetadata::default()
    };
    ctx.sessions
        .create(&IngestSession::new(&session_id, items.len(), metadata))
        .await
        .context("Failed to create session record")?;

    let exe = std::env::current_exe().context("Failed to locate own executable")?;
    std::process::Command::new(exe)
        .arg("run-worker")
        .arg("--session-id")
        .arg(&session_id)
        .arg("--folder")
        .arg(&folder)
        .arg("--max-workers")
        .arg(max_workers.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to spawn worker process")?;

    let output_data = SubmitOutput {
        session_id,
        folder: folder.display().to_string(),
        total_items: items.len(),
        max_workers,
    };
    output(&output_data, json_mode);
    Ok(())
}
