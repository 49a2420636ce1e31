//! Chat-completion client abstraction
//!
//! The pipeline talks to the model through [`ChatModel`] so the HTTP layer
//! can be exercised with fake models in tests. [`OpenAiClient`] is the
//! production implementation.

pub mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request to LLM API failed: {0}")]
    Transport(String),

    #[error("LLM API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from LLM API: {0}")]
    InvalidResponse(String),
}

pub type LlmResult<T> = Result<T, LlmError>;

/// A model that turns a conversation into a single assistant reply
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logging
    fn model_name(&self) -> &str;

    /// Send the messages and return the assistant's text content
    async fn complete(&self, messages: Vec<ChatMessage>) -> LlmResult<String>;
}
