// Per-client sliding-window rate limiter for the chat endpoint.
//
// Each client key owns a queue of request timestamps. On every check the
// queue is pruned to the trailing 60 seconds; the request is admitted only if
// fewer than `limit` timestamps remain. Rejected requests are not recorded.
//
// The table is shared by all request handlers, so the prune/count/record
// sequence for one key runs under a single lock. Keys whose queue has emptied
// are dropped by `evict_idle_at`, which the server calls on a timer.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::http::HeaderMap;

/// Length of the lookback window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Bucket shared by every request that carries no client address.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub struct ClientRateLimiter {
    /// Requests per window; zero or negative disables limiting.
    limit: i64,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl ClientRateLimiter {
    pub fn new(limit_per_minute: i64) -> Self {
        Self {
            limit: limit_per_minute,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Check and record a request for `key` at the current time.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    /// Check and record a request for `key` at `now`.
    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let mut hits = self.table();
        let queue = hits.entry(key.to_string()).or_default();
        prune(queue, now);

        if queue.len() as i64 >= self.limit {
            return false;
        }
        queue.push_back(now);
        true
    }

    /// Drop clients with no request inside the window. Returns how many keys
    /// were removed.
    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let mut hits = self.table();
        let before = hits.len();
        hits.retain(|_, queue| {
            prune(queue, now);
            !queue.is_empty()
        });
        before - hits.len()
    }

    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    /// Number of client keys currently held in memory.
    pub fn tracked_clients(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        // A panic while holding the lock leaves the table consistent enough
        // to keep counting.
        self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn prune(queue: &mut VecDeque<Instant>, now: Instant) {
    while let Some(&oldest) = queue.front() {
        if now.duration_since(oldest) > WINDOW {
            queue.pop_front();
        } else {
            break;
        }
    }
}

/// Derive the rate-limit key for a request.
///
/// Prefers the first `x-forwarded-for` entry, then `x-real-ip`, then the
/// socket peer address. Without any of those every caller shares the
/// `"unknown"` bucket.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(xff) = header_str("x-forwarded-for") {
        let first = xff.split(',').next().unwrap_or_default().trim();
        return first.to_string();
    }
    if let Some(real_ip) = header_str("x-real-ip") {
        return real_ip.to_string();
    }
    match peer {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}
