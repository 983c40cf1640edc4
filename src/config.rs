use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

/// Changelog channel the release announcer always posts to.
pub const DEFAULT_CHANGELOG_CHANNEL_ID: &str = "1454574317873397771";

/// Settings for the chat endpoint.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Character budget for the whole conversation and for the last user message.
    pub max_input_chars: usize,
    /// Requests per client per minute; zero or negative turns limiting off.
    pub rate_limit_per_minute: i64,
    /// Optional static site served next to the API (the chat widget).
    pub web_root: Option<PathBuf>,
}

impl ServerConfig {
    /// Largest request body accepted before parsing.
    pub fn max_body_bytes(&self) -> usize {
        self.max_input_chars.saturating_mul(8)
    }
}

/// Settings for the remote chat model.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    /// Running inside a hosted/serverless deployment (VERCEL is set).
    pub hosted: bool,
}

/// Settings for the GitHub release announcer.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub github_owner: String,
    pub github_repo: String,
    pub github_token: String,
    pub poll_interval: Duration,
    pub include_prereleases: bool,
    pub announce_on_start: bool,
    /// Default for `mentionEveryone` when the state file has no value.
    pub mention_everyone: bool,
    pub discord_token: String,
    pub changelog_channel_id: String,
    pub state_path: PathBuf,
}

/// Central configuration loaded from environment variables.
///
/// Secrets come from the environment only. `.env.local` and `.env` are
/// loaded at startup via dotenvy without overriding variables that are
/// already set.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ollama: OllamaConfig,
    pub bot: BotConfig,
    /// Path or name of the `plats` executable.
    pub plats_path: String,
}

/// Load `.env.local` then `.env` from the working directory, if present.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = match lookup("VLAAMSCODEX_AI_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                anyhow::anyhow!("VLAAMSCODEX_AI_PORT is not a valid port: {raw}")
            })?,
            None => 5174,
        };

        let max_input_chars = env_int(&lookup, &["MAX_INPUT_CHARS", "AI_MAX_INPUT_CHARS"], 8000);
        let server = ServerConfig {
            host: text("VLAAMSCODEX_AI_HOST", "127.0.0.1"),
            port,
            max_input_chars: usize::try_from(max_input_chars).unwrap_or(0),
            rate_limit_per_minute: env_int(
                &lookup,
                &["RATE_LIMIT_PER_MINUTE", "AI_RATE_LIMIT_PER_MINUTE"],
                30,
            ),
            web_root: lookup("VLAAMSCODEX_WEB_ROOT")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };

        let timeout_secs = lookup("OLLAMA_TIMEOUT_S")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(20.0)
            .max(1.0);
        let ollama = OllamaConfig {
            base_url: text("OLLAMA_BASE_URL", "http://localhost:11434")
                .trim_end_matches('/')
                .to_string(),
            model: text("OLLAMA_MODEL", "llama3.1"),
            timeout: Duration::from_secs_f64(timeout_secs),
            hosted: lookup("VERCEL").is_some_and(|v| !v.is_empty()),
        };

        let poll_ms = env_int(&lookup, &["POLL_INTERVAL_MS"], 300_000).max(10_000);
        let bot = BotConfig {
            github_owner: text("GITHUB_OWNER", "brentishere41848"),
            github_repo: text("GITHUB_REPO", "Vlaams-Codex"),
            github_token: text("GITHUB_TOKEN", ""),
            poll_interval: Duration::from_millis(poll_ms as u64),
            include_prereleases: parse_bool(lookup("INCLUDE_PRERELEASES").as_deref(), true),
            announce_on_start: parse_bool(lookup("ANNOUNCE_ON_START").as_deref(), false),
            mention_everyone: parse_bool(lookup("MENTION_EVERYONE").as_deref(), true),
            discord_token: text("DISCORD_TOKEN", ""),
            changelog_channel_id: text("CHANGELOG_CHANNEL_ID", DEFAULT_CHANGELOG_CHANNEL_ID),
            state_path: lookup("VLAAMSCODEX_STATE_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_state_path),
        };

        Ok(Self {
            server,
            ollama,
            bot,
            plats_path: text("PLATS_PATH", "plats"),
        })
    }

    /// Check that a Discord bot token is configured.
    /// Call this before any operation that posts to Discord.
    pub fn require_discord(&self) -> Result<()> {
        if self.bot.discord_token.is_empty() {
            anyhow::bail!(
                "DISCORD_TOKEN not set. Add it to your .env file.\n\
                 It is only needed for commands that post to Discord."
            );
        }
        Ok(())
    }
}

/// Default location of the announcer state file.
pub fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vlaamscodex")
        .join("state.json")
}

/// First alias that is set and parses as an integer wins; otherwise `default`.
pub fn env_int<F>(lookup: &F, names: &[&str], default: i64) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .find_map(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Lenient boolean parsing: yes/no words and 1/0, anything else is `fallback`.
pub fn parse_bool(value: Option<&str>, fallback: bool) -> bool {
    let Some(raw) = value else {
        return fallback;
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => true,
        "0" | "false" | "no" | "n" | "off" => false,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.server.max_input_chars, 8000);
        assert_eq!(config.server.rate_limit_per_minute, 30);
        assert_eq!(config.server.port, 5174);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.ollama.model, "llama3.1");
        assert_eq!(config.ollama.timeout, Duration::from_secs(20));
        assert!(!config.ollama.hosted);
        assert_eq!(config.bot.poll_interval, Duration::from_millis(300_000));
        assert!(config.bot.include_prereleases);
        assert!(!config.bot.announce_on_start);
        assert_eq!(config.bot.changelog_channel_id, DEFAULT_CHANGELOG_CHANNEL_ID);
        assert_eq!(config.plats_path, "plats");
    }

    #[test]
    fn test_env_int_alias_fallthrough() {
        let lookup = lookup_from(&[("RATE_LIMIT_PER_MINUTE", "lots"), ("AI_RATE_LIMIT_PER_MINUTE", "5")]);
        assert_eq!(
            env_int(&lookup, &["RATE_LIMIT_PER_MINUTE", "AI_RATE_LIMIT_PER_MINUTE"], 30),
            5
        );
    }

    #[test]
    fn test_negative_budget_becomes_zero() {
        let config = Config::from_lookup(lookup_from(&[("MAX_INPUT_CHARS", "-1")])).unwrap();
        assert_eq!(config.server.max_input_chars, 0);
    }

    #[test]
    fn test_timeout_floor_and_base_url_trim() {
        let config = Config::from_lookup(lookup_from(&[
            ("OLLAMA_TIMEOUT_S", "0.2"),
            ("OLLAMA_BASE_URL", "https://ollama.example.org///"),
            ("VERCEL", "1"),
        ]))
        .unwrap();
        assert_eq!(config.ollama.timeout, Duration::from_secs(1));
        assert_eq!(config.ollama.base_url, "https://ollama.example.org");
        assert!(config.ollama.hosted);
    }

    #[test]
    fn test_poll_interval_floor() {
        let config = Config::from_lookup(lookup_from(&[("POLL_INTERVAL_MS", "500")])).unwrap();
        assert_eq!(config.bot.poll_interval, Duration::from_millis(10_000));
    }

    #[test]
    fn test_bad_port_is_an_error() {
        assert!(Config::from_lookup(lookup_from(&[("VLAAMSCODEX_AI_PORT", "http")])).is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some(" YES "), false));
        assert!(!parse_bool(Some("off"), true));
        assert!(parse_bool(Some("maybe"), true));
        assert!(!parse_bool(None, false));
    }
}
