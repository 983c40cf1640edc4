// Discord message formatting for release announcements and link posts.
//
// Discord rejects messages over 2000 characters. Announcements are built from
// a header (mention, title, link, timestamp), a body and a footer of fixed
// project links. Only the body is ever shortened, so the header and footer
// always survive intact.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use super::github::Release;

/// Discord's per-message character limit.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Marker appended to a shortened body.
pub const TRUNCATION_SUFFIX: &str = "… (ingekort)";

/// Longest title kept in an announcement header.
pub const MAX_TITLE_CHARS: usize = 256;

pub const FIXED_LINKS: [&str; 6] = [
    "https://marketplace.visualstudio.com/items?itemName=PlatsVlaamseCodex.vlaamscodex-platskript",
    "https://open-vsx.org/extension/PlatsVlaamseCodex/vlaamscodex-platskript",
    "https://github.com/brentishere41848/Vlaams-Codex",
    "https://www.npmjs.com/package/vlaamscodex",
    "https://pypi.org/manage/project/vlaamscodex/releases/",
    "https://vlaamscodex.site",
];

pub const X_LINK: &str = "https://x.com/vlaamscodex";

const EMPTY_BODY: &str = "Geen changelog opgegeven.";
const DEFAULT_TITLE: &str = "Nieuwe release";

/// Break `@everyone` and `@here` with a zero-width space so they cannot ping.
pub fn neutralize_mentions(text: &str) -> String {
    text.replace("@everyone", "@\u{200B}everyone")
        .replace("@here", "@\u{200B}here")
}

/// Cut `text` to at most `max_len` characters, ending with `suffix` when cut.
pub fn truncate_with_suffix(text: &str, max_len: usize, suffix: &str) -> String {
    let len = text.chars().count();
    if len <= max_len {
        return text.to_string();
    }
    if max_len == 0 {
        return String::new();
    }
    let suffix_len = suffix.chars().count();
    if suffix_len >= max_len {
        return suffix.chars().take(max_len).collect();
    }
    let mut out: String = text.chars().take(max_len - suffix_len).collect();
    out.push_str(suffix);
    out
}

/// Footer with every fixed link, embeds suppressed.
pub fn fixed_links_line() -> String {
    FIXED_LINKS
        .iter()
        .map(|u| format!("<{u}>"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// One link per line, for the `links` command.
pub fn links_list() -> String {
    FIXED_LINKS
        .iter()
        .map(|u| format!("<{u}>"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The long-form links post for the links channel.
pub fn links_message() -> String {
    [
        "Awel se, pak u nen koffie en zet u efkes: hier zenne de VlaamsCodex-links waar ge mee kunt stoefen.".to_string(),
        String::new(),
        format!("- VS Code Marketplace: <{}>", FIXED_LINKS[0]),
        format!("- Open VSX: <{}>", FIXED_LINKS[1]),
        format!("- GitHub: <{}>", FIXED_LINKS[2]),
        format!("- NPM: <{}>", FIXED_LINKS[3]),
        format!("- PyPI (ja, da’s nen rare /manage/ link, mo ’t moet zo): <{}>", FIXED_LINKS[4]),
        format!("- Docs: <{}>", FIXED_LINKS[5]),
        format!("- X (Twitter, hoe ge ’t ook noemt): <{X_LINK}>"),
        String::new(),
        "En nu: goa gij wa plansen of wa? ’t Es tijd da ge iets schoons in mekaar steekt.".to_string(),
    ]
    .join("\n")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Build the changelog post for `release`.
pub fn format_release_announcement(release: &Release, mention_everyone: bool) -> String {
    let raw_title = non_empty(release.name.as_deref())
        .or_else(|| non_empty(release.tag_name.as_deref()))
        .unwrap_or(DEFAULT_TITLE);
    let title = truncate_with_suffix(&neutralize_mentions(raw_title), MAX_TITLE_CHARS, "…");
    let url = release.html_url.as_deref().unwrap_or_default().trim();

    let mut header = Vec::new();
    if mention_everyone {
        header.push("@everyone".to_string());
    }
    header.push(format!("**{title}**"));
    if !url.is_empty() {
        header.push(format!("<{url}>"));
    }
    if let Some(published) = release.published() {
        let ts = published.timestamp();
        if ts != 0 {
            header.push(format!("<t:{ts}:F>"));
        }
    }

    let body = neutralize_mentions(release.body.as_deref().unwrap_or_default());
    let body = match body.trim() {
        "" => EMPTY_BODY,
        trimmed => trimmed,
    };

    assemble(&format!("{}\n\n", header.join("\n")), body)
}

/// Build a manual announcement with the same footer and size budget.
pub fn format_manual_announcement(text: &str, mention_everyone: bool) -> String {
    let prefix = if mention_everyone { "@everyone\n\n" } else { "" };
    let safe = neutralize_mentions(text);
    let safe = match safe.trim() {
        "" => " ",
        trimmed => trimmed,
    };
    assemble(prefix, safe)
}

fn assemble(prefix: &str, body: &str) -> String {
    let footer = fixed_links_line();
    let reserved = prefix.chars().count() + 2 + footer.chars().count();
    let max_body = MAX_MESSAGE_CHARS.saturating_sub(reserved);
    let body = truncate_with_suffix(body, max_body, TRUNCATION_SUFFIX);
    format!("{prefix}{body}\n\n{footer}")
}

const VLAAMSIFY_RULES: [(&str, &str); 6] = [
    ("jij", "gij"),
    ("niet", "nie"),
    ("wat", "wa"),
    ("heel", "kei"),
    ("goed", "goe"),
    ("hoe", "oe"),
];

static VLAAMSIFY_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    VLAAMSIFY_RULES
        .iter()
        .map(|(from, to)| {
            let re = Regex::new(&format!(r"(?i)\b{from}\b")).expect("vlaamsify pattern is valid");
            (re, *to)
        })
        .collect()
});

/// Swap a handful of standard Dutch words for their Flemish forms, keeping
/// an initial capital.
pub fn vlaamsify(input: &str) -> String {
    let mut out = input.to_string();
    for (re, to) in VLAAMSIFY_PATTERNS.iter() {
        out = re
            .replace_all(&out, |caps: &Captures| {
                let matched = &caps[0];
                let capitalized = matched.chars().next().is_some_and(char::is_uppercase);
                if capitalized {
                    capitalize(to)
                } else {
                    to.to_string()
                }
            })
            .into_owned();
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
