//! Noise filtering for extracted observations.
//!
//! Extraction returns everything it finds; callers that store or notify on
//! observations run them through [`is_significant`] first.

use once_cell::sync::Lazy;
use ptylens_types::{Observation, ObservationKind};
use regex::Regex;

const MIN_CONTENT_CHARS: usize = 10;

/// Minimum share of alphanumeric characters among non-space characters.
const MIN_ALNUM_RATIO: f64 = 0.4;

/// Residual bracket-escape remnant such as `[2K` or `[0m`.
static ESCAPE_REMNANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+[A-Za-z]").expect("Invalid escape remnant regex"));

/// Mostly single-character tokens: "a b c d e ...".
static SPACED_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\S\s){5,}").expect("Invalid spaced chars regex"));

static SYMBOL_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]{5,}").expect("Invalid symbol run regex"));

static RULE_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s\-_]*$").expect("Invalid rule regex"));

static SPINNER_WORDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)loading|spinner").expect("Invalid spinner regex"));

/// Navigation commands that never matter on their own. Matched as plain
/// substrings, so `build:tools` and `abcd x` are rejected too.
const TRIVIAL_COMMAND_FRAGMENTS: [&str; 3] = ["ls", "cd ", "pwd"];

/// Whether `obs` is worth keeping.
pub fn is_significant(obs: &Observation) -> bool {
    let content = obs.content.as_str();

    if content.chars().count() < MIN_CONTENT_CHARS {
        return false;
    }
    if !looks_like_clean_text(content) || is_noise(content) {
        return false;
    }

    match obs.kind {
        ObservationKind::Decision | ObservationKind::FileEdit => true,
        ObservationKind::Command => !TRIVIAL_COMMAND_FRAGMENTS
            .iter()
            .any(|fragment| content.contains(fragment)),
        // Every message that got this far is kept, whatever its messageType:
        // warnings and task_complete are treated like errors and successes.
        ObservationKind::Message => true,
        ObservationKind::ToolUse => true,
    }
}

/// Keep only significant observations, preserving order.
pub fn filter_significant(observations: Vec<Observation>) -> Vec<Observation> {
    observations.into_iter().filter(is_significant).collect()
}

/// Heuristic for text that rendered cleanly rather than as escape debris.
fn looks_like_clean_text(content: &str) -> bool {
    if ESCAPE_REMNANT_RE.is_match(content)
        || SPACED_CHARS_RE.is_match(content)
        || SYMBOL_RUN_RE.is_match(content)
    {
        return false;
    }

    let (total, alnum) = content
        .chars()
        .filter(|c| !c.is_whitespace())
        .fold((0usize, 0usize), |(total, alnum), c| {
            (total + 1, alnum + usize::from(c.is_alphanumeric()))
        });

    total > 0 && (alnum as f64) / (total as f64) >= MIN_ALNUM_RATIO
}

fn is_noise(content: &str) -> bool {
    content.starts_with("file_read:")
        || content.starts_with("...")
        || RULE_LINE_RE.is_match(content)
        || SPINNER_WORDS_RE.is_match(content)
}
