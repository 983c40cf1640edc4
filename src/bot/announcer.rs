// Announcement sink: where formatted posts go.
//
// The watcher only needs "post this text, maybe allowing @everyone". The
// Discord implementation uses the channel messages REST endpoint with a bot
// token; tests use an in-memory sink.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// Default Discord REST API base.
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

#[async_trait]
pub trait Announcer: Send + Sync {
    /// Post `content`. `allow_everyone` controls whether an `@everyone` in
    /// the text actually pings.
    async fn post(&self, content: &str, allow_everyone: bool) -> Result<()>;
}

pub struct DiscordAnnouncer {
    client: reqwest::Client,
    base_url: String,
    token: String,
    channel_id: String,
}

impl DiscordAnnouncer {
    pub fn new(base_url: &str, token: &str, channel_id: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("DiscordBot (https://vlaamscodex.site, 0.1)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    pub fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.base_url, self.channel_id)
    }
}

#[async_trait]
impl Announcer for DiscordAnnouncer {
    async fn post(&self, content: &str, allow_everyone: bool) -> Result<()> {
        let parse = if allow_everyone { vec!["everyone"] } else { Vec::new() };
        let payload = CreateMessage {
            content,
            allowed_mentions: AllowedMentions { parse },
        };

        debug!(channel = %self.channel_id, chars = content.chars().count(), "Posting to Discord");

        let response = self
            .client
            .post(self.messages_url())
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
            .json(&payload)
            .send()
            .await
            .context("Discord API request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Discord API returned {status}: {body}");
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
    allowed_mentions: AllowedMentions,
}

#[derive(Serialize)]
struct AllowedMentions {
    parse: Vec<&'static str>,
}
