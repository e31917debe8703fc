//! Markdown touch-ups applied to assistant replies before they are stored.
//!
//! Two fixed heuristics run in order:
//!
//! 1. **Term emphasis** – bare mentions of "cardiomegaly" (any case) become
//!    `**Cardiomegaly**`, unless the reply already emphasizes the term.
//! 2. **Cause lists** – when a reply introduces causes with one of the known
//!    lead-in phrases and has no bullet list yet, a bullet is started after the
//!    lead-in and every `. Capitalized clause:` after it becomes a bold bullet.
//!
//! The rules are deliberately narrow and are not idempotent in general. Rule 2
//! will also bulletize unrelated clauses such as `. Note:` once it is triggered.

use std::sync::LazyLock;

use regex::Regex;

static TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)cardiomegaly").expect("valid term regex"));

static EMPHASIZED_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*cardiomegaly\*\*").expect("valid emphasis regex"));

static LEAD_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(can result from various factors, including:|can be caused by:|can include:)\s*",
    )
    .expect("valid lead-in regex")
});

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*•]\s").expect("valid bullet regex"));

static LABELED_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s+([A-Z][^.:\n]*):").expect("valid clause regex"));

const EMPHASIZED_FORM: &str = "**Cardiomegaly**";

/// Applies the reply heuristics. Text not matched by a rule is left untouched.
pub fn format_reply(reply: &str) -> String {
    let mut formatted = reply.to_string();

    if TERM.is_match(&formatted) && !EMPHASIZED_TERM.is_match(&formatted) {
        formatted = TERM.replace_all(&formatted, EMPHASIZED_FORM).into_owned();
    }

    if should_bulletize(&formatted) {
        formatted = bulletize(&formatted);
    }

    formatted
}

/// Starts a list after the first lead-in and bulletizes labeled clauses that follow it.
/// Text before the lead-in is kept as is.
fn bulletize(text: &str) -> String {
    let Some(caps) = LEAD_IN.captures(text) else {
        return text.to_string();
    };
    let (Some(whole), Some(phrase)) = (caps.get(0), caps.get(1)) else {
        return text.to_string();
    };

    let tail = LABELED_CLAUSE.replace_all(&text[whole.end()..], ".\n- **$1**:");
    format!("{}{}\n\n- {}", &text[..whole.start()], phrase.as_str(), tail)
}

fn should_bulletize(text: &str) -> bool {
    (text.contains("factors") || text.contains("include"))
        && LEAD_IN.is_match(text)
        && !BULLET.is_match(text)
}
