// Release watcher: polls GitHub and announces new releases.
//
// Only one check runs at a time. A check that starts while another is in
// flight (a slow poll overlapping the next tick, or a manual force-check)
// returns `Busy` immediately instead of queueing.
//
// The first successful check on a fresh state file only records the latest
// release id, unless ANNOUNCE_ON_START is set, so restarting the bot with a
// lost state file does not re-announce an old release.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::announcer::Announcer;
use super::format::{format_manual_announcement, format_release_announcement};
use super::github::{pick_latest, GitHubClient, Release, ReleaseId};
use super::state::{AnnouncementState, StateStore};

/// Result of one release check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Another check was already running.
    Busy,
    /// GitHub lists no eligible release.
    NoRelease,
    /// First run: the latest id was recorded without posting.
    Initialized(ReleaseId),
    /// The latest release was already announced.
    UpToDate(ReleaseId),
    Posted(ReleaseId),
    /// Formatting succeeded but the post did not go through; state unchanged.
    PostFailed(ReleaseId),
}

/// Which repository to watch and how.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    pub owner: String,
    pub repo: String,
    pub include_prereleases: bool,
    pub announce_on_start: bool,
}

pub struct ReleaseWatcher {
    github: GitHubClient,
    announcer: Arc<dyn Announcer>,
    store: StateStore,
    target: WatchTarget,
    state: Mutex<AnnouncementState>,
    busy: AtomicBool,
}

/// Clears the busy flag when a check ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ReleaseWatcher {
    /// Create a watcher, loading (and normalizing) the state file.
    pub async fn new(
        github: GitHubClient,
        announcer: Arc<dyn Announcer>,
        store: StateStore,
        target: WatchTarget,
    ) -> Result<Self> {
        let state = store.load().await?;
        Ok(Self {
            github,
            announcer,
            store,
            target,
            state: Mutex::new(state),
            busy: AtomicBool::new(false),
        })
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> AnnouncementState {
        self.state.lock().await.clone()
    }

    /// Fetch releases and return the one that would be announced.
    pub async fn latest_release(&self) -> Result<Option<Release>> {
        let releases = self
            .github
            .fetch_releases(&self.target.owner, &self.target.repo)
            .await?;
        Ok(pick_latest(&releases, self.target.include_prereleases).cloned())
    }

    /// Check for a new release. `force` posts the latest release even when it
    /// was already announced.
    pub async fn check(&self, force: bool) -> Result<CheckOutcome> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(CheckOutcome::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let Some(latest) = self.latest_release().await? else {
            return Ok(CheckOutcome::NoRelease);
        };
        let latest_id = latest.id.clone();

        let mut state = self.state.lock().await;

        if !force && state.is_first_run() && !self.target.announce_on_start {
            state.last_release_id = Some(latest_id.clone());
            self.store.save(&state).await?;
            info!(release = %latest_id, "Recorded latest release on first run");
            return Ok(CheckOutcome::Initialized(latest_id));
        }

        let already_announced = state
            .last_release_id
            .as_ref()
            .is_some_and(|last| last.same_as(&latest_id));
        if !force && already_announced {
            return Ok(CheckOutcome::UpToDate(latest_id));
        }

        let content = format_release_announcement(&latest, state.mention_everyone);
        match self.announcer.post(&content, state.mention_everyone).await {
            Ok(()) => {
                state.last_release_id = Some(latest_id.clone());
                self.store.save(&state).await?;
                info!(release = %latest_id, force, "Release announced");
                Ok(CheckOutcome::Posted(latest_id))
            }
            Err(e) => {
                error!(error = %e, release = %latest_id, "Failed to post release announcement");
                Ok(CheckOutcome::PostFailed(latest_id))
            }
        }
    }

    /// Post a hand-written announcement with the usual footer.
    pub async fn announce_manual(&self, text: &str) -> Result<()> {
        let mention_everyone = self.state.lock().await.mention_everyone;
        let content = format_manual_announcement(text, mention_everyone);
        self.announcer.post(&content, mention_everyone).await
    }

    /// Flip the @everyone setting and persist it. Returns the new value.
    pub async fn toggle_everyone(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.mention_everyone = !state.mention_everyone;
        self.store.save(&state).await?;
        Ok(state.mention_everyone)
    }

    /// Check once now, then every `interval`. Never returns.
    pub async fn run(&self, interval: Duration) {
        self.log_check(self.check(false).await, "Initial check");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.log_check(self.check(false).await, "Polling check");
        }
    }

    fn log_check(&self, result: Result<CheckOutcome>, phase: &str) {
        match result {
            Ok(CheckOutcome::Busy) => warn!(phase, "Previous check still running, skipped"),
            Ok(outcome) => info!(phase, outcome = ?outcome, "Release check done"),
            Err(e) => error!(phase, error = %e, "Release check failed"),
        }
    }
}
