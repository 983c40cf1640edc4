// Colored terminal output for classification reports, chat outcomes and
// release previews. main.rs delegates all display work here.

use colored::Colorize;

use crate::bot::github::Release;
use crate::bot::state::AnnouncementState;
use crate::moderation::detectors::{detect_forbidden_language_request, detect_prompt_injection};
use crate::moderation::language::{Direction, Language, LanguageScore};
use crate::moderation::pipeline::moderate_input;
use crate::moderation::tokenizer::tokens;
use crate::moderation::{ChatMessage, ChatOutcome};

/// Show how the moderation gate sees a piece of text.
pub fn display_classification(text: &str, max_input_chars: usize) {
    let toks = tokens(text);
    let score = LanguageScore::from_tokens(&toks);

    println!("\n{}", "=== Moderation Report ===".bold());
    println!();
    println!("  Tokens ({}): {}", toks.len(), toks.join(" ").dimmed());
    println!(
        "  Hits: target {}  |  en {}  |  fr {}  |  de {}",
        score.target, score.english, score.french, score.german
    );

    let (inbound, outbound) = if toks.is_empty() {
        (Language::Target, Language::Target)
    } else {
        (score.verdict(Direction::Inbound), score.verdict(Direction::Outbound))
    };
    println!("  Inbound:  {}", colorize_language(inbound));
    println!("  Outbound: {}", colorize_language(outbound));

    match detect_prompt_injection(text) {
        Some(phrase) => println!("  Injection: {}", format!("\"{phrase}\"").red()),
        None => println!("  Injection: {}", "none".green()),
    }
    match detect_forbidden_language_request(text) {
        Some(phrase) => println!("  Language request: {}", format!("\"{phrase}\"").red()),
        None => println!("  Language request: {}", "none".green()),
    }

    let verdict = moderate_input(&[ChatMessage::user(text)], max_input_chars);
    let verdict_str = format!("{verdict:?}");
    if verdict.is_allowed() {
        println!("\n  Verdict: {}", verdict_str.green().bold());
    } else {
        println!("\n  Verdict: {}", verdict_str.red().bold());
    }
}

/// Print the result of a direct chat.
pub fn display_chat_outcome(outcome: &ChatOutcome) {
    match outcome {
        ChatOutcome::Reply(text) => println!("{text}"),
        ChatOutcome::Refused { verdict, message } => {
            println!("{} {}", format!("[{verdict:?}]").yellow(), message);
        }
        ChatOutcome::Offline => {
            println!(
                "{} {}",
                "[Offline]".red(),
                crate::moderation::refusal::OFFLINE
            );
        }
    }
}

/// Print a formatted announcement the way it would be posted.
pub fn display_release(release: &Release, content: &str) {
    let title = release
        .name
        .as_deref()
        .or(release.tag_name.as_deref())
        .unwrap_or("?");
    println!(
        "\n{}",
        format!("=== Latest release: {title} ===").bold()
    );
    if let Some(published) = &release.published_at {
        println!("  Published: {}", published.dimmed());
    }
    println!("  Length: {} / 2000 chars", content.chars().count());
    println!("  {}", "-".repeat(60).dimmed());
    println!("{content}");
    println!("  {}", "-".repeat(60).dimmed());
}

/// Print the announcer configuration and persisted state.
pub fn display_bot_config(config: &crate::config::BotConfig, state: &AnnouncementState) {
    println!("channelId: {}", state.channel_id);
    println!("mentionEveryone: {}", state.mention_everyone);
    println!("pollInterval: {}", config.poll_interval.as_millis());
    println!("repo: {}/{}", config.github_owner, config.github_repo);
    println!("includePrereleases: {}", config.include_prereleases);
    match &state.last_release_id {
        Some(id) => println!("lastReleaseId: {id}"),
        None => println!("lastReleaseId: {}", "none".dimmed()),
    }
    println!("stateFile: {}", config.state_path.display());
}

fn colorize_language(language: Language) -> colored::ColoredString {
    match language {
        Language::Target => "target".green(),
        Language::Other => "other".red().bold(),
    }
}
