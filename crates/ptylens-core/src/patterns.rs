//! Static pattern tables used by the observation miner.
//!
//! Three collections, compiled once and never mutated:
//! - tool-use patterns keyed by tool name,
//! - an ordered list of decision-intent phrasings,
//! - message patterns keyed by message type.
//!
//! Plus the multi-line patterns that are only scanned over a whole
//! accumulated transcript (git commits, package installs, test summaries).
//!
//! For patterns with several capture groups the payload is the first group
//! that participated in the match; patterns without groups use the whole match.

use once_cell::sync::Lazy;
use ptylens_types::ObservationKind;
use regex::{Captures, Regex};

/// A named recognizer with a payload capture.
#[derive(Debug)]
pub struct NamedPattern {
    pub name: &'static str,
    pub regex: Regex,
}

impl NamedPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).unwrap_or_else(|e| panic!("Invalid {} regex: {}", name, e)),
        }
    }

    /// Payload of the first match in `text`, if any.
    pub fn payload<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex.captures(text).map(|caps| payload_of(&caps))
    }

    /// Whole match plus payload of the first match in `text`, if any.
    pub fn find<'t>(&self, text: &'t str) -> Option<(&'t str, &'t str)> {
        self.regex.captures(text).map(|caps| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or("");
            (whole, payload_of(&caps))
        })
    }
}

fn payload_of<'t>(caps: &Captures<'t>) -> &'t str {
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// Kind of a tool-use observation, derived from its tool name.
pub fn tool_kind(tool: &str) -> ObservationKind {
    if tool.starts_with("file_edit") || tool.starts_with("file_write") {
        ObservationKind::FileEdit
    } else if tool.starts_with("bash") {
        ObservationKind::Command
    } else {
        ObservationKind::ToolUse
    }
}

/// A file path with an extension, optionally quoted or wrapped in parens.
const PATH: &str = r#"[\s(:]+["'`]?([\w~./-]*\w\.\w+)"#;

/// Tool-use patterns.
///
/// Covers both Claude Code's `● Tool(args)` headers and plain progress
/// phrasing ("Editing src/app.ts").
pub static TOOL_PATTERNS: Lazy<Vec<NamedPattern>> = Lazy::new(|| {
    vec![
        NamedPattern::new(
            "file_read",
            &format!(r"\b(?:Reading|Read)(?:\s+file)?{}", PATH),
        ),
        NamedPattern::new(
            "file_edit",
            &format!(r"\b(?:Editing|Edited|Edit|Updating|Updated|Update)(?:\s+file)?{}", PATH),
        ),
        NamedPattern::new(
            "file_write",
            &format!(r"\b(?:Writing|Wrote|Write|Creating|Created|Create)(?:\s+file)?{}", PATH),
        ),
        NamedPattern::new(
            "file_delete",
            &format!(r"\b(?:Deleting|Deleted|Delete|Removing|Removed)(?:\s+file)?{}", PATH),
        ),
        NamedPattern::new(
            "search_grep",
            r#"\b(?:Grep|Search|Searching for)\s*[(:]?\s*(?:pattern:\s*)?["'`]([^"'`\n]+)["'`]"#,
        ),
        NamedPattern::new(
            "search_glob",
            r#"\bGlob\s*[(:]?\s*(?:pattern:\s*)?["'`]?([^"'`)\n\s]+)"#,
        ),
        NamedPattern::new(
            "bash_command",
            r"(?m)\bBash\s*\(\s*([^)\n]+?)\s*\)|^\s*\$\s+(\S[^\n]*)$",
        ),
        NamedPattern::new("bash_output", r"(?m)^\s*⎿\s+(\S[^\n]*)$"),
        NamedPattern::new(
            "web_fetch",
            r#"\b(?:WebFetch|Fetching)\s*[(:]?\s*(?:url:\s*)?["'`]?(https?://[^\s"'`)]+)"#,
        ),
        NamedPattern::new(
            "web_search",
            r#"\b(?:WebSearch|Searching the web for|Web search)\s*[(:]?\s*(?:query:\s*)?["'`]?([^"'`)\n]+)"#,
        ),
    ]
});

/// Decision-intent phrasings, tried in order.
///
/// The payload runs lazily to the end of the sentence (terminal punctuation
/// followed by whitespace or end of line), so dotted paths stay intact.
pub static DECISION_PATTERNS: Lazy<Vec<NamedPattern>> = Lazy::new(|| {
    const TAIL: &str = r"\s+([^\n]+?)(?:[.!?]+(?:\s|$)|$)";
    [
        ("i_will", r"\bI(?:'|’)ll"),
        ("i_will", r"\bI will"),
        ("let_me", r"\bLet me"),
        ("going_to", r"\bI(?:'|’)m going to"),
        ("should", r"\bI should"),
        ("need_to", r"\bI need to"),
        ("decided", r"\bI(?:'|’)ve decided to"),
        ("best_approach", r"\b[Tt]he best approach (?:is|would be)(?: to)?"),
        ("plan", r"\b[Mm]y plan is(?: to)?"),
    ]
    .into_iter()
    .map(|(name, lead)| NamedPattern::new(name, &format!("(?m){}{}", lead, TAIL)))
    .collect()
});

/// Message patterns keyed by message type.
pub static MESSAGE_PATTERNS: Lazy<Vec<NamedPattern>> = Lazy::new(|| {
    vec![
        NamedPattern::new(
            "error",
            r"(?mi)^\s*(?:[✗×✘]\s*)?(?:error|fatal|exception)(?:\[[A-Za-z]*\d+\])?:\s*(\S[^\n]*)$",
        ),
        NamedPattern::new(
            "success",
            r"(?m)^\s*[✓✔]\s+(\S[^\n]*)$|\b((?:[Ss]uccessfully|SUCCESS(?:FULLY)?)\s+[^\n.]+)",
        ),
        NamedPattern::new(
            "warning",
            r"(?mi)^\s*(?:⚠\s*)?warn(?:ing)?(?:\[[A-Za-z]*\d+\])?:\s*(\S[^\n]*)$",
        ),
        NamedPattern::new(
            "task_complete",
            r"(?i)\b(?:task (?:is )?completed?|all (?:tasks )?(?:are )?done|finished successfully|implementation (?:is )?complete)\b[^\n]*",
        ),
    ]
});

/// `[<branch> <hash>] <message>` as printed by `git commit`. The message may
/// wrap onto the following rendered line.
pub static GIT_COMMIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([\w./-]+)(?: \(root-commit\))? ([0-9a-f]{6,40})\]\s+(\S[^\n]*)")
        .expect("Invalid git commit regex")
});

/// `npm install ...`, `pnpm add ...`, `yarn add ...`.
pub static PACKAGE_INSTALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(npm|pnpm|yarn)\s+(install|add)\b([^\n]*)").expect("Invalid package install regex")
});

/// Which capture groups of a test summary regex hold the counts.
#[derive(Debug)]
pub struct TestSummaryPattern {
    pub regex: Regex,
    pub passed_group: usize,
    pub failed_group: usize,
}

/// Test summary variants: "12 passed, 1 failed", "1 failed, 12 passed",
/// cargo's "12 passed; 1 failed", jest's "Tests: 1 failed, 12 passed".
pub static TEST_SUMMARY_PATTERNS: Lazy<Vec<TestSummaryPattern>> = Lazy::new(|| {
    [
        (r"(?i)\b(\d+) (?:tests? )?passed[,;]\s*(\d+) (?:tests? )?failed", 1, 2),
        (r"(?i)\b(\d+) (?:tests? )?failed[,;]\s*(\d+) (?:tests? )?passed", 2, 1),
    ]
    .into_iter()
    .map(|(pattern, passed_group, failed_group)| TestSummaryPattern {
        regex: Regex::new(pattern).expect("Invalid test summary regex"),
        passed_group,
        failed_group,
    })
    .collect()
});
