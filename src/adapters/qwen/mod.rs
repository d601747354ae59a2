//! Vision-language model extraction adapters.
//!
//! The collaborator is an OpenAI-compatible chat completion endpoint (vLLM
//! serving Qwen2.5-VL by default). Phase A extracts a structured metadata
//! field map from profile sheets; phase B extracts a deduplicated skill list
//! from free-form resumes. Both adapters persist what they extract into the
//! candidate record store.

pub mod client;
pub mod extractors;

pub use client::QwenVlClient;
pub use extractors::{QwenMetadataExtractor, QwenSkillExtractor};
