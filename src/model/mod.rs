// Chat model backend: trait-based so the pipeline can be tested without a
// running model server.
//
// `OllamaClient` talks to an Ollama-compatible `/api/chat` endpoint. Tests
// substitute their own `ChatModel` to count calls or script replies.

pub mod ollama;
pub mod prompt;

use anyhow::Result;
use async_trait::async_trait;

use crate::moderation::ChatMessage;

/// A remote chat-completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the conversation and return the assistant's reply text.
    ///
    /// Implementations must fail (not return an empty string) when the
    /// backend has nothing usable to say.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
