//! One-line human summaries of an observation list.

use ptylens_types::{Observation, ObservationKind};

/// Returned when no edits, commands or decisions were observed.
pub const NO_SIGNIFICANT_OBSERVATIONS: &str = "No significant observations";

/// Summarize edits, commands and decisions, e.g.
/// `"Files edited: 2, Commands run: 5, Decisions made: 1"`.
///
/// Groups with a zero count are left out. `tool_use` and `message`
/// observations are not counted.
pub fn summarize(observations: &[Observation]) -> String {
    let count = |kind: ObservationKind| observations.iter().filter(|o| o.kind == kind).count();

    let parts: Vec<String> = [
        ("Files edited", count(ObservationKind::FileEdit)),
        ("Commands run", count(ObservationKind::Command)),
        ("Decisions made", count(ObservationKind::Decision)),
    ]
    .into_iter()
    .filter(|(_, n)| *n > 0)
    .map(|(label, n)| format!("{}: {}", label, n))
    .collect();

    if parts.is_empty() {
        NO_SIGNIFICANT_OBSERVATIONS.to_string()
    } else {
        parts.join(", ")
    }
}
