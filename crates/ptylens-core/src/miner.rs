//! Observation mining over rendered terminal text.
//!
//! Two entry points:
//! - [`extract_chunk`] renders a single chunk on a fresh screen and matches
//!   the pattern tables once against the cleaned text.
//! - [`extract_accumulated`] renders the concatenation of many chunks, matches
//!   every non-empty line independently, deduplicates by `(kind, content)`,
//!   then scans the whole text for git commits, package installs and test
//!   summaries.
//!
//! Extraction returns everything it finds; noise filtering is a separate pass
//! (see [`crate::is_significant`]).

use crate::ansi::clean_text;
use crate::patterns::{
    tool_kind, DECISION_PATTERNS, GIT_COMMIT_RE, MESSAGE_PATTERNS, PACKAGE_INSTALL_RE,
    TEST_SUMMARY_PATTERNS, TOOL_PATTERNS,
};
use crate::screen::ScreenBuffer;
use once_cell::sync::Lazy;
use ptylens_types::{Observation, ObservationKind};
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Decisions with a payload this short are too vague to keep.
const MIN_DECISION_PAYLOAD: usize = 15;

static SEGMENT_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").expect("Invalid split regex"));

/// Render `raw` on a fresh screen and run the regex cleanup over the result.
pub fn render_clean(raw: &str) -> String {
    let rendered = ScreenBuffer::new().process(raw);
    clean_text(&rendered)
}

/// Extract observations from a single raw chunk.
pub fn extract_chunk(raw_text: &str) -> Vec<Observation> {
    let cleaned = render_clean(raw_text);
    let observations = match_segment(&cleaned);
    trace!(
        target: "ptylens::miner",
        "Chunk of {} bytes yielded {} observations",
        raw_text.len(),
        observations.len()
    );
    observations
}

/// Extract observations from a sequence of historical chunks.
///
/// The chunks are concatenated and rendered together so that redraws and
/// patterns spanning chunk boundaries resolve the way the terminal showed
/// them.
pub fn extract_accumulated<S: AsRef<str>>(raw_chunks: &[S]) -> Vec<Observation> {
    let combined: String = raw_chunks.iter().map(|c| c.as_ref()).collect();
    let cleaned = render_clean(&combined);

    let mut seen: HashSet<(ObservationKind, String)> = HashSet::new();
    let mut observations = Vec::new();
    let mut push_unique = |obs: Observation, out: &mut Vec<Observation>| {
        if seen.insert(obs.owned_key()) {
            out.push(obs);
        }
    };

    for segment in SEGMENT_SPLIT_RE.split(&cleaned) {
        if segment.trim().is_empty() {
            continue;
        }
        for obs in match_segment(segment) {
            push_unique(obs, &mut observations);
        }
    }

    let per_segment = observations.len();
    for obs in scan_multiline(&cleaned) {
        push_unique(obs, &mut observations);
    }

    debug!(
        target: "ptylens::miner",
        "Accumulated extraction over {} chunks: {} segment observations, {} from multi-line scans",
        raw_chunks.len(),
        per_segment,
        observations.len() - per_segment
    );
    observations
}

/// Apply the tool, decision and message tables to one piece of cleaned text.
pub fn match_segment(text: &str) -> Vec<Observation> {
    let mut observations = Vec::new();

    for pattern in TOOL_PATTERNS.iter() {
        if let Some(payload) = pattern.payload(text) {
            let target = clean_capture(payload);
            if target.is_empty() {
                continue;
            }
            observations.push(
                Observation::new(tool_kind(pattern.name), format!("{}: {}", pattern.name, target))
                    .with_meta("tool", pattern.name)
                    .with_meta("target", target),
            );
        }
    }

    if let Some(decision) = first_decision(text) {
        observations.push(decision);
    }

    for pattern in MESSAGE_PATTERNS.iter() {
        if let Some(payload) = pattern.payload(text) {
            let payload = payload.trim();
            if payload.is_empty() {
                continue;
            }
            observations.push(
                Observation::new(ObservationKind::Message, format!("{}: {}", pattern.name, payload))
                    .with_meta("messageType", pattern.name),
            );
        }
    }

    observations
}

/// The first decision phrasing that matches is the only candidate; it is
/// kept when its payload is long enough and not an ellipsis-trailed status.
fn first_decision(text: &str) -> Option<Observation> {
    let (pattern, whole, payload) = DECISION_PATTERNS
        .iter()
        .find_map(|p| p.find(text).map(|(whole, payload)| (p, whole, payload)))?;

    let payload = payload.trim();
    if payload.chars().count() <= MIN_DECISION_PAYLOAD || has_ellipsis(payload) {
        trace!(target: "ptylens::miner", "Rejected decision candidate {:?}", payload);
        return None;
    }

    let phrase = whole.trim().trim_end_matches(['.', '!', '?']).trim_end();
    Some(
        Observation::new(ObservationKind::Decision, phrase)
            .with_meta("intent", payload)
            .with_meta("phrasing", pattern.name),
    )
}

fn has_ellipsis(s: &str) -> bool {
    s.contains("...") || s.contains('…')
}

/// Strip surrounding quotes, trailing ellipses and trailing whitespace.
fn clean_capture(raw: &str) -> String {
    let mut s = raw.trim();
    loop {
        let before = s.len();
        s = s.trim_end();
        s = s.strip_suffix("...").unwrap_or(s);
        s = s.strip_suffix('…').unwrap_or(s);
        s = s.trim_matches(['"', '\'', '`']);
        if s.len() == before {
            break;
        }
    }
    s.trim().to_string()
}

/// Scans that only make sense over the whole accumulated text.
fn scan_multiline(text: &str) -> Vec<Observation> {
    let mut observations = Vec::new();

    for caps in GIT_COMMIT_RE.captures_iter(text) {
        let branch = &caps[1];
        let hash = &caps[2];
        let message = caps[3].trim();
        observations.push(
            Observation::new(ObservationKind::Command, format!("git commit {}: {}", hash, message))
                .with_meta("tool", "git_commit")
                .with_meta("branch", branch)
                .with_meta("commitHash", hash)
                .with_meta("message", message),
        );
    }

    for caps in PACKAGE_INSTALL_RE.captures_iter(text) {
        let manager = &caps[1];
        let verb = &caps[2];
        let args = caps[3].trim();
        let content = if args.is_empty() {
            format!("{} {}", manager, verb)
        } else {
            format!("{} {} {}", manager, verb, args)
        };
        observations.push(
            Observation::new(ObservationKind::Command, content)
                .with_meta("tool", "package_install")
                .with_meta("manager", manager)
                .with_meta("target", args),
        );
    }

    for pattern in TEST_SUMMARY_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let (Some(passed), Some(failed)) = (
                parse_count(&caps[pattern.passed_group]),
                parse_count(&caps[pattern.failed_group]),
            ) else {
                continue;
            };
            observations.push(
                Observation::new(
                    ObservationKind::ToolUse,
                    format!("tests: {} passed, {} failed", passed, failed),
                )
                .with_meta("tool", "test")
                .with_meta("passed", passed)
                .with_meta("failed", failed),
            );
        }
    }

    observations
}

fn parse_count(s: &str) -> Option<i64> {
    s.parse().ok()
}
