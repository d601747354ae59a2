//! Terminal output helpers: JSON/human rendering, tables, progress bars.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::domain::models::{IngestSession, SessionStatus};

/// Structured output of one command, renderable for humans or machines.
pub trait CommandOutput {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

/// Print a command result in the requested mode.
pub fn output(data: &impl CommandOutput, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&data.to_json()).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("{}", data.to_human());
    }
}

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg} (ETA: {eta})";
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Progress bar used by `status --watch`.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .expect("Invalid progress bar template")
            .progress_chars(PROGRESS_CHARS),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Styled status name for terminal display.
pub fn styled_status(status: SessionStatus) -> String {
    let text = status.as_str();
    match status {
        SessionStatus::Running => style(text).cyan().to_string(),
        SessionStatus::Completed => style(text).green().to_string(),
        SessionStatus::Failed => style(text).red().to_string(),
        SessionStatus::Abandoned | SessionStatus::Archived => {
            style(text).yellow().to_string()
        }
    }
}

/// Render sessions as a table.
pub fn format_sessions_table(sessions: &[IngestSession]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Session", "Status", "Progress", "Current item", "Started", "Updated",
        ]);

    for session in sessions {
        let short_id = session
            .session_id
            .get(..8)
            .unwrap_or(&session.session_id);
        table.add_row(vec![
            Cell::new(short_id),
            Cell::new(session.status.as_str()),
            Cell::new(format!(
                "{}/{}",
                session.processed_items, session.total_items
            )),
            Cell::new(session.current_item.as_deref().unwrap_or("-")),
            Cell::new(session.started_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(session.updated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]);
    }

    table.to_string()
}
