//! CLI type definitions.
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};

use crate::cli::commands::cancel::CancelArgs;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::run_worker::RunWorkerArgs;
use crate::cli::commands::sessions::SessionsArgs;
use crate::cli::commands::status::StatusArgs;
use crate::cli::commands::submit::SubmitArgs;

#[derive(Parser)]
#[command(name = "resume-ingest")]
#[command(about = "Concurrent resume batch-ingestion orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration and database
    Init(InitArgs),

    /// Submit a batch folder for background ingestion
    Submit(SubmitArgs),

    /// Show progress for an ingestion session
    Status(StatusArgs),

    /// Request cooperative cancellation of a running session
    Cancel(CancelArgs),

    /// List running ingestion sessions
    Sessions(SessionsArgs),

    /// Run the ingestion worker (spawned by `submit`)
    #[command(hide = true)]
    RunWorker(RunWorkerArgs),
}
