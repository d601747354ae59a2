//! Ports: trait boundaries between the domain and the outside world.

pub mod extractors;
pub mod session_repository;

pub use extractors::{MetadataExtractor, RecordStore, SkillExtractor};
pub use session_repository::SessionRepository;
