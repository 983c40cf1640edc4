// POST /api/chat: moderated chat completion.
//
// Request checks run in order and the first failure answers:
//   rate limit (429) -> body size (413) -> JSON (400 BAD_JSON)
//   -> shape (400 BAD_REQUEST) -> moderation pipeline
// Policy refusals are 200 with `refused: true`; any model failure is 503.

use std::net::SocketAddr;

use axum::body::to_bytes;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::moderation::pipeline::normalize_messages;
use crate::moderation::rate_limit::client_key;
use crate::moderation::{process_chat, refusal, ChatOutcome};
use crate::web::{api_error, json_response, AppState};

const BAD_JSON: &str = "Da is gene proper JSON, jong.";
const BAD_REQUEST: &str = "Da requestke klopt ni.";
const MISSING_MESSAGES: &str = "Ge mist `messages[]`.";

pub async fn chat(State(state): State<AppState>, request: Request) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer);

    if !state.limiter.allow(&key) {
        info!(client = %key, "Rate limited");
        return api_error(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", refusal::RATE_LIMITED);
    }

    let max_body = state.config.max_body_bytes();
    let declared_len = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_len.is_some_and(|len| len > max_body) {
        return api_error(StatusCode::PAYLOAD_TOO_LARGE, "TOO_LARGE", refusal::TOO_LARGE);
    }

    let bytes = match to_bytes(request.into_body(), max_body).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Failed to read request body");
            return api_error(StatusCode::PAYLOAD_TOO_LARGE, "TOO_LARGE", refusal::TOO_LARGE);
        }
    };

    let body: Value = if bytes.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(_) => return api_error(StatusCode::BAD_REQUEST, "BAD_JSON", BAD_JSON),
        }
    };

    let Value::Object(body) = body else {
        return api_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", BAD_REQUEST);
    };
    let Some(Value::Array(raw_messages)) = body.get("messages") else {
        return api_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", MISSING_MESSAGES);
    };

    let messages = normalize_messages(raw_messages);
    let outcome = process_chat(&messages, state.model.as_ref(), state.config.max_input_chars).await;

    match outcome {
        ChatOutcome::Reply(content) => assistant_reply(&content, false),
        ChatOutcome::Refused { message, .. } => assistant_reply(message, true),
        ChatOutcome::Offline => {
            api_error(StatusCode::SERVICE_UNAVAILABLE, "AI_OFFLINE", refusal::OFFLINE)
        }
    }
}

fn assistant_reply(content: &str, refused: bool) -> Response {
    json_response(
        StatusCode::OK,
        json!({
            "message": { "role": "assistant", "content": content },
            "refused": refused,
        }),
    )
}
