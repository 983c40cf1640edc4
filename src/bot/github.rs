// GitHub releases client: unauthenticated or token-authenticated REST over HTTP.
//
// Only the releases listing is used. A configured token that GitHub rejects
// (401) is not fatal: the request is repeated once without it, since public
// repositories are readable anonymously.

use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default GitHub REST API endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Characters left alone in a path segment, matching `encodeURIComponent`
/// for the characters that occur in owner and repository names.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Release identifier as stored in the state file: GitHub sends numbers, but
/// older state files may hold strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReleaseId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseId::Number(n) => write!(f, "{n}"),
            ReleaseId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl ReleaseId {
    /// Numbers and their string form are the same release.
    pub fn same_as(&self, other: &ReleaseId) -> bool {
        self.to_string() == other.to_string()
    }

    /// Empty strings count as "no release recorded".
    pub fn is_blank(&self) -> bool {
        matches!(self, ReleaseId::Text(s) if s.is_empty())
    }
}

/// A release object from `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Release {
    pub id: ReleaseId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub prerelease: Option<bool>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Release {
    pub fn published(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Choose the newest published release.
///
/// Drafts, releases without a publish date and (unless included) prereleases
/// are skipped. Ties keep the order GitHub returned.
pub fn pick_latest(releases: &[Release], include_prereleases: bool) -> Option<&Release> {
    releases
        .iter()
        .filter(|r| r.draft == Some(false))
        .filter(|r| include_prereleases || r.prerelease == Some(false))
        .filter(|r| r.published_at.as_deref().is_some_and(|p| !p.is_empty()))
        .rev()
        .max_by_key(|r| r.published())
}

pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("VLAAMSCODEX-DiscordBot")
            .build()
            .context("Failed to build HTTP client")?;

        let token = token.trim();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: (!token.is_empty()).then(|| token.to_string()),
        })
    }

    pub fn releases_url(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases?per_page=10&page=1",
            self.base_url,
            utf8_percent_encode(owner, PATH_SEGMENT),
            utf8_percent_encode(repo, PATH_SEGMENT),
        )
    }

    /// Fetch the ten most recent releases. A non-array body yields an empty list.
    pub async fn fetch_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        let url = self.releases_url(owner, repo);
        debug!(%url, "Fetching releases");

        let mut response = self.get(&url, self.token.as_deref()).await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED && self.token.is_some() {
            let mut details = response.text().await.unwrap_or_default();
            if details.is_empty() {
                details = "Bad credentials".to_string();
            }
            warn!(%details, "GitHub token rejected (401), retrying without token");
            response = self.get(&url, None).await?;
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API returned {status}: {body}");
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse GitHub releases response")?;

        let serde_json::Value::Array(items) = json else {
            return Ok(Vec::new());
        };

        // One malformed entry should not hide the others.
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Release>(item).ok())
            .collect())
    }

    async fn get(&self, url: &str, token: Option<&str>) -> Result<reqwest::Response> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
            .send()
            .await
            .context("GitHub API request failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_url_encodes_segments() {
        let client = GitHubClient::new("https://api.github.com/", "").unwrap();
        assert_eq!(
            client.releases_url("brentishere41848", "Vlaams-Codex"),
            "https://api.github.com/repos/brentishere41848/Vlaams-Codex/releases?per_page=10&page=1"
        );
        assert_eq!(
            client.releases_url("a b", "c/d"),
            "https://api.github.com/repos/a%20b/c%2Fd/releases?per_page=10&page=1"
        );
    }

    #[test]
    fn test_release_id_compares_by_text() {
        assert!(ReleaseId::Number(42).same_as(&ReleaseId::Text("42".into())));
        assert!(!ReleaseId::Number(42).same_as(&ReleaseId::Number(43)));
        assert!(ReleaseId::Text(String::new()).is_blank());
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let client = GitHubClient::new(DEFAULT_GITHUB_API_URL, "   ").unwrap();
        assert!(client.token.is_none());
    }
}
