//! Implementation of the hidden `resume-ingest run-worker` command.
//!
//! This is the entry point of the detached worker process spawned by
//! `submit`. It builds the extraction pipeline and runs the batch to
//! completion.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::qwen::{QwenMetadataExtractor, QwenSkillExtractor, QwenVlClient};
use crate::adapters::sqlite::SqliteRecordStore;
use crate::cli::context::CliContext;
use crate::domain::ports::{RecordStore, SessionRepository};
use crate::services::{CandidateProcessor, IngestOrchestrator};

#[derive(Args, Debug)]
pub struct RunWorkerArgs {
    /// Session id allocated by `submit`
    #[arg(long)]
    pub session_id: String,

    /// Root folder containing one subdirectory per candidate
    #[arg(long)]
    pub folder: PathBuf,

    /// Worker pool ceiling for this batch
    #[arg(long)]
    pub max_workers: Option<usize>,
}

pub async fn execute(args: RunWorkerArgs, _json_mode: bool) -> Result<()> {
    let ctx = CliContext::init().await?;

    let store = SqliteRecordStore::new(ctx.pool.clone());
    let client = QwenVlClient::new(&ctx.config.extraction)
        .context("Failed to build extraction client")?;
    let metadata = Arc::new(QwenMetadataExtractor::new(client.clone(), store.clone()));
    let skills = Arc::new(QwenSkillExtractor::new(client, store.clone()));

    let processor = Arc::new(CandidateProcessor::new(
        metadata,
        skills,
        &ctx.config.ingest,
    ));

    let sessions: Arc<dyn SessionRepository> = ctx.sessions.clone();
    let records: Arc<dyn RecordStore> = Arc::new(store);
    let orchestrator =
        IngestOrchestrator::new(sessions, processor, ctx.config.ingest.clone())
            .with_record_store(records);

    orchestrator
        .run(Some(args.session_id), &args.folder, args.max_workers)
        .await
        .context("Ingestion run failed")?;
    Ok(())
}
