//! Adapters: concrete implementations of the domain ports.

pub mod qwen;
pub mod sqlite;
