//! Implementation of the `resume-ingest cancel` command.
//!
//! Cancellation only flips the session status in the ledger; the worker
//! process notices at its next poll. Items already dispatched finish, items
//! never started are abandoned.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::context::CliContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::SessionStatus;
use crate::domain::ports::SessionRepository;

#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Session ID
    pub session_id: String,

    /// Mark the session ARCHIVED instead of ABANDONED (also the recovery
    /// path for a session orphaned by a dead worker)
    #[arg(long)]
    pub archive: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct CancelOutput {
    pub session_id: String,
    pub requested_status: String,
    pub cancelled: bool,
    pub current_status: Option<String>,
}

impl CommandOutput for CancelOutput {
    fn to_human(&self) -> String {
        if self.cancelled {
            format!(
                "Cancellation requested ({}). In-flight items will finish; \
                 unstarted items are abandoned.",
                self.requested_status
            )
        } else {
            format!(
                "Session {} is not running (status: {}); nothing to cancel.",
                self.session_id,
                self.current_status.as_deref().unwrap_or("unknown")
            )
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: CancelArgs, json_mode: bool) -> Result<()> {
    let ctx = CliContext::init().await?;

    let status = if args.archive {
        SessionStatus::Archived
    } else {
        SessionStatus::Abandoned
    };

    let cancelled = ctx
        .sessions
        .request_cancel(&args.session_id, status)
        .await
        .context("Failed to request cancellation")?;

    let current_status = if cancelled {
        Some(status.to_string())
    } else {
        ctx.sessions
            .get(&args.session_id)
            .await
            .ok()
            .flatten()
            .map(|s| s.status.to_string())
    };

    let output_data = CancelOutput {
        session_id: args.session_id,
        requested_status: status.to_string(),
        cancelled,
        current_status,
    };
    output(&output_data, json_mode);
    Ok(())
}
