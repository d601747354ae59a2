//! Append-only, timestamped run log for one ingestion session.
//!
//! The artifact mirrors what the worker traces, but survives as a plain file
//! an operator can tail or attach; its path is recorded in the session
//! metadata. Writes go through a non-blocking appender so slow disks never
//! stall a worker.

use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

#[derive(Clone)]
pub struct RunLog {
    inner: Option<RunLogInner>,
}

#[derive(Clone)]
struct RunLogInner {
    writer: NonBlocking,
    path: PathBuf,
    // Flushes buffered lines when the last clone drops.
    _guard: Arc<WorkerGuard>,
}

impl RunLog {
    /// Create the log file `ingestion_log_<sid8>_<timestamp>.log` under
    /// `logs_dir`.
    pub fn create(logs_dir: &Path, session_id: &str) -> std::io::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;

        let short_id = session_id.get(..8).unwrap_or(session_id);
        let filename = format!(
            "ingestion_log_{}_{}.log",
            short_id,
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = logs_dir.join(&filename);

        let appender = tracing_appender::rolling::never(logs_dir, &filename);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        Ok(Self {
            inner: Some(RunLogInner {
                writer,
                path,
                _guard: Arc::new(guard),
            }),
        })
    }

    /// A no-op log, used when the artifact could not be created; the run
    /// proceeds with tracing output only.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.as_ref().map(|inner| inner.path.as_path())
    }

    /// Append one timestamped line.
    pub fn line(&self, message: &str) {
        if let Some(inner) = &self.inner {
            let mut writer = inner.writer.clone();
            let _ = writeln!(
                writer,
                "{} - {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S"),
                message
            );
        }
    }

    /// Append a separator rule.
    pub fn rule(&self) {
        self.line(&"=".repeat(60));
    }
}
