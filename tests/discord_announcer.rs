// Integration tests for the Discord announcer against a local REST stand-in.
//
// A small Axum server records the headers and JSON of every channel message
// post, so the tests can check path, auth header and allowed mentions.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use vlaamscodex::bot::announcer::{Announcer, DiscordAnnouncer};

#[derive(Debug, Clone)]
struct Posted {
    authorization: Option<String>,
    body: Value,
}

type Received = Arc<Mutex<Vec<Posted>>>;

async fn create_message(
    State(received): State<Received>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    received.lock().unwrap().push(Posted {
        authorization,
        body,
    });
    Json(json!({ "id": "1" }))
}

async fn missing_access() -> (StatusCode, &'static str) {
    (StatusCode::FORBIDDEN, r#"{"message": "Missing Access", "code": 50001}"#)
}

/// Serve a fake Discord API on an ephemeral port, returning its base URL.
async fn discord_server(received: Received) -> String {
    let app = Router::new()
        .route("/channels/42/messages", post(create_message))
        .route("/channels/403/messages", post(missing_access))
        .with_state(received);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// ============================================================
// Request shape
// ============================================================

#[tokio::test]
async fn posts_to_channel_with_bot_token() {
    let received = Received::default();
    let base_url = discord_server(received.clone()).await;
    let announcer = DiscordAnnouncer::new(&base_url, "s3cret", "42").unwrap();
    assert_eq!(announcer.messages_url(), format!("{base_url}/channels/42/messages"));

    announcer.post("@everyone\n**v1.0.0**", true).await.unwrap();

    let posts = received.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].authorization.as_deref(), Some("Bot s3cret"));
    assert_eq!(
        posts[0].body,
        json!({
            "content": "@everyone\n**v1.0.0**",
            "allowed_mentions": { "parse": ["everyone"] }
        })
    );
}

#[tokio::test]
async fn everyone_not_allowed_sends_empty_parse_list() {
    let received = Received::default();
    let base_url = discord_server(received.clone()).await;
    let announcer = DiscordAnnouncer::new(&base_url, "s3cret", "42").unwrap();

    announcer.post("**v1.0.1**", false).await.unwrap();

    let posts = received.lock().unwrap();
    assert_eq!(posts[0].body["allowed_mentions"], json!({ "parse": [] }));
}

// ============================================================
// Failures
// ============================================================

#[tokio::test]
async fn non_success_status_is_an_error() {
    let received = Received::default();
    let base_url = discord_server(received.clone()).await;
    let announcer = DiscordAnnouncer::new(&base_url, "s3cret", "403").unwrap();

    let err = announcer.post("**v1.0.2**", false).await.unwrap_err();

    assert!(err.to_string().contains("403"));
    assert!(err.to_string().contains("Missing Access"));
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_api_is_an_error() {
    // nothing listens on a freshly released ephemeral port
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let announcer = DiscordAnnouncer::new(&format!("http://{addr}"), "s3cret", "42").unwrap();
    assert!(announcer.post("**v1.0.3**", false).await.is_err());
}
