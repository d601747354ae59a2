//! Domain models.

pub mod candidate;
pub mod config;
pub mod session;

pub use candidate::{CandidateItem, FieldMap, ItemOutcome};
pub use config::{Config, DatabaseConfig, ExtractionConfig, IngestConfig, LoggingConfig};
pub use session::{IngestSession, SessionMetadata, SessionStatus};
