// Runner for the external `plats` CLI.
//
// The interpreter itself lives outside this crate. This module finds the
// executable (PLATS_PATH, default `plats`), runs it with output streamed to
// the terminal, and turns loose snippets into runnable programs: CRLF is
// normalized, a `plan doe ... gedaan` wrapper is added when missing, and the
// `# coding: vlaamsplats` cookie is prepended.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex_lite::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

pub const CODING_COOKIE: &str = "# coding: vlaamsplats";

static PLAN_DOE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bplan\s+doe\b").expect("plan pattern is valid"));
static GEDAAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgedaan\b").expect("gedaan pattern is valid"));

pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Prepend the coding cookie unless the text already declares one.
pub fn ensure_coding_cookie(text: &str) -> String {
    if text.trim_start().starts_with("# coding:") {
        return text.to_string();
    }
    format!("{CODING_COOKIE}\n{text}")
}

/// Wrap `text` in `plan doe` / `gedaan` unless both are already present.
/// Non-blank lines are indented two spaces.
pub fn ensure_program_wrapper(text: &str) -> String {
    if PLAN_DOE.is_match(text) && GEDAAN.is_match(text) {
        return text.to_string();
    }
    let body = text
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("  {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("plan doe\n{body}\n\ngedaan\n")
}

/// Turn a pasted snippet into a complete program.
pub fn prepare_snippet(text: &str) -> String {
    ensure_coding_cookie(&ensure_program_wrapper(&normalize_newlines(text)))
}

/// Exit status of a finished `plats` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub struct PlatsRunner {
    path: PathBuf,
}

impl PlatsRunner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `plats <subcommand> <args..>` in `cwd`, echoing its output.
    pub async fn run(&self, subcommand: &str, args: &[String], cwd: Option<&Path>) -> Result<RunResult> {
        let mut command = Command::new(&self.path);
        command
            .arg(subcommand)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        debug!(path = %self.path.display(), subcommand, ?args, "Spawning plats");

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => bail!(
                "Could not find the '{}' executable. Install VlaamsCodex (pipx/pip) or set PLATS_PATH.",
                self.path.display()
            ),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to start {}", self.path.display()))
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        tokio::join!(
            pump(stdout, |line| println!("{line}")),
            pump(stderr, |line| eprintln!("{line}")),
        );

        let status = child
            .wait()
            .await
            .with_context(|| format!("Failed to wait for {}", self.path.display()))?;
        Ok(RunResult { code: status.code() })
    }

    /// Prepare `snippet`, write it to a temporary `.plats` file and run it.
    /// The file is removed afterwards whatever the outcome.
    pub async fn run_snippet(&self, snippet: &str, cwd: Option<&Path>) -> Result<RunResult> {
        let program = prepare_snippet(snippet);
        let tmp = std::env::temp_dir().join(format!(
            "vlaamscodex-selection-{}-{}.plats",
            std::process::id(),
            chrono::Utc::now().timestamp_millis()
        ));
        tokio::fs::write(&tmp, program)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        debug!(file = %tmp.display(), "Wrote snippet");

        let result = self
            .run("run", &[tmp.to_string_lossy().into_owned()], cwd)
            .await;

        if let Err(e) = tokio::fs::remove_file(&tmp).await {
            warn!(file = %tmp.display(), error = %e, "Failed to remove snippet file");
        }
        result
    }
}

async fn pump<R, F>(stream: Option<R>, mut emit: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let Some(stream) = stream else { return };
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        emit(&line);
    }
}
