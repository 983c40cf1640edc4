// Chat moderation pipeline: the single decision path shared by the HTTP
// endpoint and the direct CLI chat.
//
// Input checks run in a fixed order and the first failing check wins:
//   total size -> last user message present -> its size -> injection
//   -> language-switch request -> inbound language
// Only an `Allowed` input reaches the model. The model's reply then gets the
// outbound language check before it is returned.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::detectors::{detect_forbidden_language_request, detect_prompt_injection};
use super::language::{detect_output_language, detect_user_language, Language};
use super::refusal;
use crate::model::ChatModel;
use crate::output::truncate_chars;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Outcome of the moderation checks for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationVerdict {
    Allowed,
    RateLimited,
    TooLong,
    InjectionRefused,
    ForbiddenLanguageRefused,
    NonTargetLanguageRefused,
}

impl ModerationVerdict {
    pub fn is_allowed(self) -> bool {
        self == ModerationVerdict::Allowed
    }

    /// The fixed text shown for this verdict, `None` for `Allowed`.
    pub fn message(self) -> Option<&'static str> {
        match self {
            ModerationVerdict::Allowed => None,
            ModerationVerdict::RateLimited => Some(refusal::RATE_LIMITED),
            ModerationVerdict::TooLong => Some(refusal::TOO_LONG),
            ModerationVerdict::InjectionRefused => Some(refusal::INJECTION_REFUSAL),
            ModerationVerdict::ForbiddenLanguageRefused
            | ModerationVerdict::NonTargetLanguageRefused => Some(refusal::LANGUAGE_REFUSAL),
        }
    }
}

/// What the caller should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The model's answer passed every check.
    Reply(String),
    /// A policy check fired; `message` is the fixed refusal text.
    Refused {
        verdict: ModerationVerdict,
        message: &'static str,
    },
    /// The model could not be reached or returned nothing usable.
    Offline,
}

impl ChatOutcome {
    fn refused(verdict: ModerationVerdict) -> Self {
        ChatOutcome::Refused {
            verdict,
            message: verdict.message().unwrap_or(refusal::LANGUAGE_REFUSAL),
        }
    }
}

/// Keep only well-formed messages: objects with a known role and string content.
pub fn normalize_messages(raw: &[serde_json::Value]) -> Vec<ChatMessage> {
    raw.iter()
        .filter_map(|value| {
            let obj = value.as_object()?;
            let role = Role::parse(obj.get("role")?.as_str()?)?;
            let content = obj.get("content")?.as_str()?;
            Some(ChatMessage::new(role, content))
        })
        .collect()
}

/// Content of the most recent user message with non-blank text.
pub fn last_user_text(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User && !m.content.trim().is_empty())
        .map(|m| m.content.as_str())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Run the input checks. Only the last user message is inspected for content.
pub fn moderate_input(messages: &[ChatMessage], max_input_chars: usize) -> ModerationVerdict {
    let total: usize = messages.iter().map(|m| char_len(&m.content)).sum();
    if total > max_input_chars {
        return ModerationVerdict::TooLong;
    }

    let Some(user_text) = last_user_text(messages) else {
        return ModerationVerdict::NonTargetLanguageRefused;
    };

    if char_len(user_text) > max_input_chars {
        return ModerationVerdict::TooLong;
    }
    if let Some(phrase) = detect_prompt_injection(user_text) {
        debug!(phrase, "Injection phrase matched");
        return ModerationVerdict::InjectionRefused;
    }
    if let Some(phrase) = detect_forbidden_language_request(user_text) {
        debug!(phrase, "Language-switch request matched");
        return ModerationVerdict::ForbiddenLanguageRefused;
    }
    if detect_user_language(user_text) != Language::Target {
        return ModerationVerdict::NonTargetLanguageRefused;
    }
    ModerationVerdict::Allowed
}

/// Check a model reply before it is shown.
pub fn moderate_output(reply: &str) -> ModerationVerdict {
    match detect_output_language(reply) {
        Language::Target => ModerationVerdict::Allowed,
        Language::Other => ModerationVerdict::NonTargetLanguageRefused,
    }
}

/// Moderate `messages`, call the model if allowed, and moderate its reply.
pub async fn process_chat(
    messages: &[ChatMessage],
    model: &dyn ChatModel,
    max_input_chars: usize,
) -> ChatOutcome {
    let verdict = moderate_input(messages, max_input_chars);
    if !verdict.is_allowed() {
        info!(verdict = ?verdict, "Input refused");
        return ChatOutcome::refused(verdict);
    }

    let reply = match model.complete(messages).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "Model call failed");
            return ChatOutcome::Offline;
        }
    };

    let verdict = moderate_output(&reply);
    if !verdict.is_allowed() {
        info!(
            reply_preview = %truncate_chars(&reply, 80),
            "Model reply refused by outbound check"
        );
        return ChatOutcome::refused(verdict);
    }

    ChatOutcome::Reply(reply)
}
