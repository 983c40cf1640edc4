// Integration tests for the GitHub releases client against a mock API.

use httpmock::prelude::*;
use serde_json::json;

use vlaamscodex::bot::github::{pick_latest, GitHubClient, ReleaseId};

const RELEASES_PATH: &str = "/repos/brentishere41848/Vlaams-Codex/releases";

fn sample_releases() -> serde_json::Value {
    json!([
        {
            "id": 202,
            "name": "v1.1.0",
            "tag_name": "v1.1.0",
            "html_url": "https://github.com/brentishere41848/Vlaams-Codex/releases/tag/v1.1.0",
            "body": "Nieuwe keywords",
            "draft": false,
            "prerelease": false,
            "published_at": "2025-07-01T12:00:00Z"
        },
        { "name": "no id, skipped" },
        {
            "id": 201,
            "tag_name": "v1.0.0",
            "draft": false,
            "prerelease": false,
            "published_at": "2025-06-01T12:00:00Z"
        }
    ])
}

#[tokio::test]
async fn fetches_and_skips_malformed_entries() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(RELEASES_PATH)
                .query_param("per_page", "10")
                .query_param("page", "1");
            then.status(200).json_body(sample_releases());
        })
        .await;

    let client = GitHubClient::new(&server.base_url(), "").unwrap();
    let releases = client
        .fetch_releases("brentishere41848", "Vlaams-Codex")
        .await
        .unwrap();

    assert_eq!(releases.len(), 2);
    let latest = pick_latest(&releases, false).unwrap();
    assert_eq!(latest.id, ReleaseId::Number(202));
    assert_eq!(latest.body.as_deref(), Some("Nieuwe keywords"));
}

#[tokio::test]
async fn rejected_token_retries_anonymously() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(RELEASES_PATH)
                .header("authorization", "Bearer stale-token");
            then.status(401).json_body(json!({ "message": "Bad credentials" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(RELEASES_PATH)
                .header_missing("authorization");
            then.status(200).json_body(sample_releases());
        })
        .await;

    let client = GitHubClient::new(&server.base_url(), "stale-token").unwrap();
    let releases = client
        .fetch_releases("brentishere41848", "Vlaams-Codex")
        .await
        .unwrap();

    assert_eq!(releases.len(), 2);
}

#[tokio::test]
async fn non_array_body_is_empty_list() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(RELEASES_PATH);
            then.status(200).json_body(json!({ "message": "Not an array" }));
        })
        .await;

    let client = GitHubClient::new(&server.base_url(), "").unwrap();
    let releases = client
        .fetch_releases("brentishere41848", "Vlaams-Codex")
        .await
        .unwrap();

    assert!(releases.is_empty());
}

#[tokio::test]
async fn server_error_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(RELEASES_PATH);
            then.status(502).body("bad gateway");
        })
        .await;

    let client = GitHubClient::new(&server.base_url(), "").unwrap();
    let err = client
        .fetch_releases("brentishere41848", "Vlaams-Codex")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("502"));
}
