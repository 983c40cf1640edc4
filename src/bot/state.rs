// Announcer state: a single JSON file, rewritten atomically on every change.
//
// The file is written to a temporary sibling and then renamed over the
// target, so a crash never leaves a half-written state behind. There is one
// writer (the announcer process), so no locking.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::github::ReleaseId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementState {
    pub last_release_id: Option<ReleaseId>,
    pub channel_id: String,
    pub mention_everyone: bool,
}

impl AnnouncementState {
    /// True until a release has been recorded.
    pub fn is_first_run(&self) -> bool {
        self.last_release_id.as_ref().map_or(true, ReleaseId::is_blank)
    }
}

pub struct StateStore {
    path: PathBuf,
    channel_id: String,
    default_mention_everyone: bool,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>, channel_id: &str, default_mention_everyone: bool) -> Self {
        Self {
            path: path.into(),
            channel_id: channel_id.to_string(),
            default_mention_everyone,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn defaults(&self) -> AnnouncementState {
        AnnouncementState {
            last_release_id: None,
            channel_id: self.channel_id.clone(),
            mention_everyone: self.default_mention_everyone,
        }
    }

    /// Read the state file, fill gaps from defaults, and write the merged
    /// result back. A missing or unreadable file means defaults.
    ///
    /// The channel id always comes from configuration, whatever the file says.
    pub async fn load(&self) -> Result<AnnouncementState> {
        let fallback = self.defaults();
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str::<serde_json::Value>(&raw).ok(),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No state file yet");
                None
            }
        };

        let merged = match raw {
            Some(serde_json::Value::Object(obj)) => AnnouncementState {
                last_release_id: obj
                    .get("lastReleaseId")
                    .and_then(|v| match v {
                        serde_json::Value::Number(_) | serde_json::Value::String(_) => {
                            serde_json::from_value::<ReleaseId>(v.clone()).ok()
                        }
                        _ => None,
                    })
                    .or(fallback.last_release_id),
                channel_id: fallback.channel_id,
                mention_everyone: obj
                    .get("mentionEveryone")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(fallback.mention_everyone),
            },
            Some(_) => {
                warn!(path = %self.path.display(), "State file is not a JSON object, using defaults");
                fallback
            }
            None => fallback,
        };

        self.save(&merged).await?;
        Ok(merged)
    }

    /// Atomically replace the state file with `state`.
    pub async fn save(&self, state: &AnnouncementState) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create state directory {}", dir.display()))?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("state.json");
        let tmp = dir.join(format!(
            ".tmp-{}-{}-{}",
            file_name,
            std::process::id(),
            chrono::Utc::now().timestamp_millis()
        ));

        let mut json = serde_json::to_string_pretty(state)?;
        json.push('\n');

        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e).with_context(|| format!("Failed to replace {}", self.path.display()));
        }
        Ok(())
    }
}
