use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use vlaamscodex::bot::announcer::{DiscordAnnouncer, DEFAULT_DISCORD_API_URL};
use vlaamscodex::bot::format;
use vlaamscodex::bot::github::{GitHubClient, DEFAULT_GITHUB_API_URL};
use vlaamscodex::bot::state::StateStore;
use vlaamscodex::bot::watcher::{CheckOutcome, ReleaseWatcher, WatchTarget};
use vlaamscodex::config::{self, Config};
use vlaamscodex::model::ollama::OllamaClient;
use vlaamscodex::moderation::{process_chat, ChatMessage, ChatOutcome};
use vlaamscodex::output::terminal;
use vlaamscodex::runner::PlatsRunner;

/// VlaamsCodex: Plat Vlaams-only AI chat, release announcer and plats tooling.
#[derive(Parser)]
#[command(name = "vlaamscodex", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the moderated chat endpoint (POST /api/chat)
    Serve {
        /// Bind address (default: VLAAMSCODEX_AI_HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port (default: VLAAMSCODEX_AI_PORT or 5174)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Send one message through the moderated chat pipeline
    Chat {
        /// The message, in Plat Vlaams
        text: String,
    },

    /// Show how the moderation checks see a piece of text
    Classify {
        text: String,
    },

    /// GitHub release announcer for Discord
    Bot {
        #[command(subcommand)]
        action: BotCommand,
    },

    /// Run the external plats CLI
    Plats {
        /// run, build, check, version, help, or snippet (reads stdin)
        subcommand: PlatsSubcommand,

        /// Arguments passed through to plats
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Subcommand)]
enum BotCommand {
    /// Poll for new releases and announce them until stopped
    Watch,

    /// Check once for a new release
    Check {
        /// Announce the latest release even if it was already posted
        #[arg(long)]
        force: bool,
    },

    /// Preview the announcement for the latest release without posting
    Latest,

    /// Post a manual announcement with the links footer
    Announce {
        text: String,
    },

    /// Flip whether announcements ping @everyone
    ToggleEveryone,

    /// Show announcer configuration and state
    Config,

    /// Print the project links
    Links {
        /// Print the long-form links post instead of the plain list
        #[arg(long)]
        full: bool,
    },

    /// Rewrite standard Dutch words into Flemish
    Vlaamsify {
        text: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatsSubcommand {
    Run,
    Build,
    Check,
    Version,
    Help,
    Snippet,
}

impl PlatsSubcommand {
    fn as_str(self) -> &'static str {
        match self {
            PlatsSubcommand::Run => "run",
            PlatsSubcommand::Build => "build",
            PlatsSubcommand::Check => "check",
            PlatsSubcommand::Version => "version",
            PlatsSubcommand::Help => "help",
            PlatsSubcommand::Snippet => "snippet",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local / .env if present (silently ignore if missing)
    config::load_dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vlaamscodex=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = Config::load()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let model = OllamaClient::new(&config.ollama)?;
            info!(
                ollama = %model.chat_url(),
                model = %config.ollama.model,
                rate_limit = config.server.rate_limit_per_minute,
                "Starting chat server"
            );
            if model.is_loopback_in_hosted() {
                println!(
                    "{} OLLAMA_BASE_URL points at localhost in a hosted deployment; chat will answer offline.",
                    "Warning:".yellow()
                );
            }

            vlaamscodex::web::run_server(config.server, Arc::new(model)).await?;
        }

        Commands::Chat { text } => {
            let config = Config::load()?;
            let model = OllamaClient::new(&config.ollama)?;
            let messages = vec![ChatMessage::user(text)];

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("  {spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(format!("Asking {}...", config.ollama.model));
            spinner.enable_steady_tick(Duration::from_millis(100));

            let outcome = process_chat(&messages, &model, config.server.max_input_chars).await;
            spinner.finish_and_clear();

            terminal::display_chat_outcome(&outcome);
            if outcome == ChatOutcome::Offline {
                std::process::exit(2);
            }
        }

        Commands::Classify { text } => {
            let config = Config::load()?;
            terminal::display_classification(&text, config.server.max_input_chars);
        }

        Commands::Bot { action } => run_bot(action).await?,

        Commands::Plats { subcommand, args } => {
            let config = Config::load()?;
            let runner = PlatsRunner::new(&config.plats_path);

            let result = match subcommand {
                PlatsSubcommand::Snippet => {
                    let mut snippet = String::new();
                    std::io::stdin()
                        .read_to_string(&mut snippet)
                        .context("Failed to read snippet from stdin")?;
                    if snippet.trim().is_empty() {
                        anyhow::bail!("No plats code on stdin.");
                    }
                    runner.run_snippet(&snippet, None).await?
                }
                other => runner.run(other.as_str(), &args, None).await?,
            };

            if !result.success() {
                let code = result.code.map_or("unknown".to_string(), |c| c.to_string());
                eprintln!(
                    "{} plats {} failed (exit code {code})",
                    "Error:".red(),
                    subcommand.as_str()
                );
                std::process::exit(result.code.unwrap_or(1));
            }
        }
    }

    Ok(())
}

async fn run_bot(action: BotCommand) -> Result<()> {
    let config = Config::load()?;
    let bot = &config.bot;

    match action {
        BotCommand::Links { full } => {
            if full {
                println!("{}", format::links_message());
            } else {
                println!("{}", format::links_list());
            }
        }

        BotCommand::Vlaamsify { text } => println!("{}", format::vlaamsify(&text)),

        BotCommand::Config => {
            let store = StateStore::new(&bot.state_path, &bot.changelog_channel_id, bot.mention_everyone);
            let state = store.load().await?;
            terminal::display_bot_config(bot, &state);
        }

        BotCommand::Latest => {
            let github = GitHubClient::new(DEFAULT_GITHUB_API_URL, &bot.github_token)?;
            let releases = github.fetch_releases(&bot.github_owner, &bot.github_repo).await?;
            let store = StateStore::new(&bot.state_path, &bot.changelog_channel_id, bot.mention_everyone);
            let state = store.load().await?;

            match vlaamscodex::bot::github::pick_latest(&releases, bot.include_prereleases) {
                Some(release) => {
                    let content = format::format_release_announcement(release, state.mention_everyone);
                    terminal::display_release(release, &content);
                }
                None => println!("Geen release gevonden."),
            }
        }

        BotCommand::ToggleEveryone => {
            let watcher = build_watcher(&config).await?;
            let enabled = watcher.toggle_everyone().await?;
            println!(
                "mentionEveryone is nu {}.",
                if enabled { "AAN".green() } else { "UIT".red() }
            );
        }

        BotCommand::Announce { text } => {
            config.require_discord()?;
            let watcher = build_watcher(&config).await?;
            watcher.announce_manual(&text).await?;
            println!("{}", "Aankondiging gepost.".bold());
        }

        BotCommand::Check { force } => {
            config.require_discord()?;
            let watcher = build_watcher(&config).await?;
            match watcher.check(force).await? {
                CheckOutcome::Busy => println!("Er loopt al een check."),
                CheckOutcome::NoRelease => println!("Geen release gevonden."),
                CheckOutcome::Initialized(id) => {
                    println!("Eerste run: release {id} onthouden zonder te posten.")
                }
                CheckOutcome::UpToDate(id) => println!("Release {id} is al aangekondigd."),
                CheckOutcome::Posted(id) => println!("{}", format!("Release {id} gepost.").bold()),
                CheckOutcome::PostFailed(id) => {
                    anyhow::bail!("Posten van release {id} naar Discord is mislukt.")
                }
            }
        }

        BotCommand::Watch => {
            config.require_discord()?;
            let watcher = build_watcher(&config).await?;
            info!(
                repo = %format!("{}/{}", bot.github_owner, bot.github_repo),
                interval_ms = bot.poll_interval.as_millis() as u64,
                "Watching for releases"
            );
            tokio::select! {
                _ = watcher.run(bot.poll_interval) => {}
                _ = tokio::signal::ctrl_c() => info!("Stopping release watcher"),
            }
        }
    }

    Ok(())
}

async fn build_watcher(config: &Config) -> Result<ReleaseWatcher> {
    let bot = &config.bot;
    let github = GitHubClient::new(DEFAULT_GITHUB_API_URL, &bot.github_token)?;
    let announcer = DiscordAnnouncer::new(
        DEFAULT_DISCORD_API_URL,
        &bot.discord_token,
        &bot.changelog_channel_id,
    )?;
    let store = StateStore::new(&bot.state_path, &bot.changelog_channel_id, bot.mention_everyone);
    let target = WatchTarget {
        owner: bot.github_owner.clone(),
        repo: bot.github_repo.clone(),
        include_prereleases: bot.include_prereleases,
        announce_on_start: bot.announce_on_start,
    };
    ReleaseWatcher::new(github, Arc::new(announcer), store, target).await
}
