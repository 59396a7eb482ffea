use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One conversational turn sent to the generation capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single generation call: system instructions plus the message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instructions: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("generation endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("stream decode error: {0}")]
    Stream(String),
    #[error("generation produced no text")]
    EmptyResponse,
    #[error("missing API key (set {0})")]
    MissingApiKey(String),
}

/// The external text-generation capability.
///
/// Implementations fully consume whatever stream the backend produces and
/// hand back the complete text; callers never see partial output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
