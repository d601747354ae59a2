//! Resume Ingest CLI entry point.

use clap::Parser;

use resume_ingest::cli::{Cli, Commands};
use resume_ingest::infrastructure::config::ConfigLoader;
use resume_ingest::infrastructure::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging_config = ConfigLoader::load()
        .map(|config| config.logging)
        .unwrap_or_default();
    logging::init(&logging_config);

    let result = match cli.command {
        Commands::Init(args) => resume_ingest::cli::commands::init::execute(args, cli.json).await,
        Commands::Submit(args) => {
            resume_ingest::cli::commands::submit::execute(args, cli.json).await
        }
        Commands::Status(args) => {
            resume_ingest::cli::commands::status::execute(args, cli.json).await
        }
        Commands::Cancel(args) => {
            resume_ingest::cli::commands::cancel::execute(args, cli.json).await
        }
        Commands::Sessions(args) => {
            resume_ingest::cli::commands::sessions::execute(args, cli.json).await
        }
        Commands::RunWorker(args) => {
            resume_ingest::cli::commands::run_worker::execute(args, cli.json).await
        }
    };

    if let Err(err) = result {
        resume_ingest::cli::handle_error(err, cli.json);
    }
}
