//! Implementation of the `resume-ingest status` command.

use anyhow::{Context, Result};
use clap::Args;
use std::time::Duration;

use crate::cli::context::CliContext;
use crate::cli::output::{create_progress_bar, output, styled_status, CommandOutput};
use crate::domain::models::IngestSession;
use crate::domain::ports::SessionRepository;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Session ID
    pub session_id: String,

    /// Keep polling until the session reaches a terminal status
    #[arg(short, long)]
    pub watch: bool,

    /// Poll interval in seconds for --watch
    #[arg(long, default_value = "2")]
    pub interval_secs: u64,
}

#[derive(Debug, serde::Serialize)]
pub struct StatusOutput {
    pub session: IngestSession,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let session = &self.session;
        let mut lines = vec![
            "Session Details:".to_string(),
            format!("  ID: {}", session.session_id),
            format!("  Status: {}", styled_status(session.status)),
            format!(
                "  Progress: {}/{} items",
                session.processed_items, session.total_items
            ),
            format!(
                "  Current item: {}",
                session.current_item.as_deref().unwrap_or("-")
            ),
            format!(
                "  Started at: {}",
                session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            format!(
                "  Updated at: {}",
                session.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        ];

        if let Some(folder) = &session.metadata.root_folder {
            lines.push(format!("  Folder: {folder}"));
        }
        if let Some(log_file) = &session.metadata.log_file_path {
            lines.push(format!("  Log file: {log_file}"));
        }

        if !session.errors.is_empty() {
            lines.push(format!("\nErrors ({}):", session.errors.len()));
            for error in &session.errors {
                lines.push(format!("  - {error}"));
            }
        }

        if !session.metadata.summary_logs.is_empty() {
            lines.push(format!(
                "\nSummary ({} lines):",
                session.metadata.summary_logs.len()
            ));
            for line in &session.metadata.summary_logs {
                lines.push(format!("  {line}"));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.session).unwrap_or_default()
    }
}

pub async fn execute(args: StatusArgs, json_mode: bool) -> Result<()> {
    let ctx = CliContext::init().await?;

    let session = fetch(&ctx, &args.session_id).await?;

    if !args.watch || json_mode || session.status.is_terminal() {
        output(&StatusOutput { session }, json_mode);
        return Ok(());
    }

    // Watch mode: poll the ledger and render a progress bar until the
    // session leaves RUNNING.
    let bar = create_progress_bar(session.total_items as u64);
    bar.set_position(session.processed_items as u64);

    let final_session = loop {
        let session = fetch(&ctx, &args.session_id).await?;
        bar.set_position(session.processed_items as u64);
        if let Some(current) = &session.current_item {
            bar.set_message(current.clone());
        }
        if session.status.is_terminal() {
            break session;
        }
        tokio::time::sleep(Duration::from_secs(args.interval_secs.max(1))).await;
    };

    bar.finish_with_message(final_session.status.as_str());
    output(&StatusOutput { session: final_session }, json_mode);
    Ok(())
}

async fn fetch(ctx: &CliContext, session_id: &str) -> Result<IngestSession> {
    ctx.sessions
        .get(session_id)
        .await
        .context("Failed to query session")?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Session {} not found. Use 'resume-ingest sessions' to list active sessions.",
                session_id
            )
        })
}
