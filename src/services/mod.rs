//! Service layer: item processing, scheduling, and run orchestration.

pub mod orchestrator;
pub mod processor;
pub mod stop_signal;
pub mod worker_pool;

pub use orchestrator::IngestOrchestrator;
pub use processor::{CandidateProcessor, ItemProcessor};
pub use stop_signal::StopSignal;
pub use worker_pool::{ProgressObserver, WorkerPool};
