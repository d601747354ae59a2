//! Implementation of the `resume-ingest sessions` command.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::context::CliContext;
use crate::cli::output::{format_sessions_table, output, CommandOutput};
use crate::domain::models::IngestSession;
use crate::domain::ports::SessionRepository;

#[derive(Args, Debug)]
pub struct SessionsArgs {}

#[derive(Debug, serde::Serialize)]
pub struct SessionsOutput {
    pub sessions: Vec<IngestSession>,
}

impl CommandOutput for SessionsOutput {
    fn to_human(&self) -> String {
        if self.sessions.is_empty() {
            return "No active ingestion sessions.".to_string();
        }
        format!(
            "Active sessions:\n{}\n\nShowing {} session(s)",
            format_sessions_table(&self.sessions),
            self.sessions.len()
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.sessions).unwrap_or_default()
    }
}

pub async fn execute(_args: SessionsArgs, json_mode: bool) -> Result<()> {
    let ctx = CliContext::init().await?;

    let sessions = ctx
        .sessions
        .list_active()
        .await
        .context("Failed to list sessions")?;

    output(&SessionsOutput { sessions }, json_mode);
    Ok(())
}
