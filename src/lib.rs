//! Resume Ingest - Concurrent candidate batch-ingestion orchestrator.
//!
//! Resume Ingest walks a folder of candidate subdirectories, runs two
//! extraction phases per candidate against an external vision-language model,
//! and tracks fine-grained progress in a durable SQLite ledger so that an
//! interactive observer can poll progress (and request cancellation) from a
//! separate process.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models and ports, no I/O
//! - **Service Layer** (`services`): Worker pool, item processing, orchestration
//! - **Adapters Layer** (`adapters`): SQLite ledger, vision-model extractors
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    CandidateItem, Config, DatabaseConfig, ExtractionConfig, FieldMap, IngestConfig,
    IngestSession, ItemOutcome, LoggingConfig, SessionMetadata, SessionStatus,
};
pub use domain::ports::{MetadataExtractor, RecordStore, SessionRepository, SkillExtractor};
pub use infrastructure::config::ConfigLoader;
pub use services::{
    CandidateProcessor, IngestOrchestrator, ItemProcessor, ProgressObserver, StopSignal,
    WorkerPool,
};
