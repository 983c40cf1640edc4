// Ollama `/api/chat` client.
//
// One non-streaming POST per conversation, bounded by a timeout. There are no
// retries: any failure (timeout, connection error, non-2xx, bad JSON, blank
// reply) is returned as an error and the pipeline reports the model offline.
//
// A hosted deployment pointing at a loopback model URL can never work, so that
// combination is rejected before any network call.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompt::SYSTEM_PROMPT_PLAT_VLAAMS_ONLY;
use super::ChatModel;
use crate::config::OllamaConfig;
use crate::moderation::{ChatMessage, Role};

pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
    hosted: bool,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("vlaamscodex/0.1 (platvlaams-ai)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: config.timeout,
            hosted: config.hosted,
        })
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// True when a hosted deployment is configured to call a loopback model.
    pub fn is_loopback_in_hosted(&self) -> bool {
        self.hosted && is_loopback_url(&self.base_url)
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(WireMessage {
            role: Role::System,
            content: SYSTEM_PROMPT_PLAT_VLAAMS_ONLY,
        });
        wire.extend(messages.iter().map(|m| WireMessage {
            role: m.role,
            content: &m.content,
        }));

        let request = ChatRequest {
            model: &self.model,
            stream: false,
            messages: wire,
        };

        debug!(model = %self.model, messages = messages.len(), "Ollama chat request");

        let response = self
            .client
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .context("Ollama endpoint unreachable")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned {status}: {body}");
        }

        let data: ChatResponse = response
            .json()
            .await
            .context("Ollama returned invalid JSON")?;

        match data.message.and_then(|m| m.content) {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => anyhow::bail!("Ollama returned an empty reply"),
        }
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        if self.is_loopback_in_hosted() {
            anyhow::bail!(
                "OLLAMA_BASE_URL points at {} in a hosted deployment",
                self.base_url
            );
        }

        match tokio::time::timeout(self.timeout, self.send(messages)).await {
            Ok(result) => result,
            Err(_) => anyhow::bail!("Ollama call timed out after {:?}", self.timeout),
        }
    }
}

fn is_loopback_url(url: &str) -> bool {
    url.contains("localhost") || url.contains("127.0.0.1")
}

// --- Ollama wire types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, hosted: bool) -> OllamaConfig {
        OllamaConfig {
            base_url: base_url.to_string(),
            model: "llama3.1".to_string(),
            timeout: Duration::from_secs(1),
            hosted,
        }
    }

    #[test]
    fn test_chat_url_trims_trailing_slashes() {
        let client = OllamaClient::new(&config("http://models.lan:11434//", false)).unwrap();
        assert_eq!(client.chat_url(), "http://models.lan:11434/api/chat");
    }

    #[test]
    fn test_loopback_only_matters_when_hosted() {
        let local = OllamaClient::new(&config("http://localhost:11434", false)).unwrap();
        assert!(!local.is_loopback_in_hosted());

        let hosted = OllamaClient::new(&config("http://127.0.0.1:11434", true)).unwrap();
        assert!(hosted.is_loopback_in_hosted());

        let remote = OllamaClient::new(&config("https://ollama.example.org", true)).unwrap();
        assert!(!remote.is_loopback_in_hosted());
    }

    #[tokio::test]
    async fn test_hosted_loopback_fails_without_network() {
        // port 9 (discard) would hang or refuse; the guard must fire first
        let client = OllamaClient::new(&config("http://localhost:9", true)).unwrap();
        let err = client
            .complete(&[ChatMessage::user("awel")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("hosted deployment"));
    }
}
