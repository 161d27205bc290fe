//! Completion API types and the upstream abstraction
//!
//! The relay talks to the completion API only through [`CompletionUpstream`],
//! which lets tests substitute a scripted upstream for the HTTP client.

pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::openai::OpenAiCompatibleClient;

/// Chat message role. Only the two roles this service sends are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Stream options for including usage in streaming responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamOptions {
    pub include_usage: bool,
}

/// Streaming chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
    /// Provider extension: disables reasoning output on models that support it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_thinking: Option<bool>,
}

/// One incremental piece of generated text. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamChunk {
    pub delta_text: String,
}

impl StreamChunk {
    pub fn new(delta_text: impl Into<String>) -> Self {
        Self {
            delta_text: delta_text.into(),
        }
    }
}

/// Errors raised by an upstream while opening or reading a stream
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion API error: {0}")]
    Api(String),

    #[error("Malformed stream event: {0}")]
    Decode(String),
}

/// Lazily produced, finite, non-restartable sequence of chunks
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, UpstreamError>> + Send>>;

/// A streaming chat-completion endpoint
#[async_trait]
pub trait CompletionUpstream: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Issue the request and return the chunk stream once the upstream has
    /// accepted it. Fails before any chunk is produced on auth, network or
    /// request errors.
    async fn open(&self, request: &CompletionRequest) -> Result<ChunkStream, UpstreamError>;
}
