//! PriceLens: turns customer-interview transcripts into pricing strategy
//! reports with a two-agent LLM pipeline, served over HTTP with a small
//! embedded web UI.

pub mod config;
pub mod input;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod shutdown;

// HTTP API + embedded UI
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export models for the binary and integration tests
pub use models::*;
