//! Observation types.
//!
//! An observation is a single semantically meaningful event mined from
//! rendered terminal output: a file edit, a shell command, a stated decision,
//! an error message and so on. Observations are plain values; once produced
//! they are never mutated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Category of an extracted observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// A tool invocation that is neither an edit nor a shell command
    /// (file reads, searches, web fetches, test summaries).
    ToolUse,
    /// A file was edited or written.
    FileEdit,
    /// A shell command ran (or produced output).
    Command,
    /// The agent stated an intent ("I'll ...", "Let me ...").
    Decision,
    /// An error, warning, success or completion message.
    Message,
}

impl ObservationKind {
    /// All kinds, in declaration order.
    pub const ALL: [ObservationKind; 5] = [
        ObservationKind::ToolUse,
        ObservationKind::FileEdit,
        ObservationKind::Command,
        ObservationKind::Decision,
        ObservationKind::Message,
    ];

    /// The snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationKind::ToolUse => "tool_use",
            ObservationKind::FileEdit => "file_edit",
            ObservationKind::Command => "command",
            ObservationKind::Decision => "decision",
            ObservationKind::Message => "message",
        }
    }
}

impl fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown observation kind name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown observation kind: '{0}'")]
pub struct ParseKindError(pub String);

impl FromStr for ObservationKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObservationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// A metadata value attached to an observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Number(i64),
    Text(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            MetadataValue::Number(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            MetadataValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Number(n) => write!(f, "{}", n),
            MetadataValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Text(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Number(n)
    }
}

/// Observation metadata. Keys are camelCase (`messageType`, `commitHash`).
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A structured event extracted from rendered terminal output.
///
/// Two observations are duplicates when they share the same `(kind, content)`
/// pair; metadata does not take part in deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub kind: ObservationKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl Observation {
    /// Create an observation without metadata.
    pub fn new(kind: ObservationKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Builder-style metadata insertion.
    pub fn with_meta(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Deduplication key.
    pub fn dedup_key(&self) -> (ObservationKind, &str) {
        (self.kind, self.content.as_str())
    }

    /// Owned deduplication key, for storing in sets that outlive the observation.
    pub fn owned_key(&self) -> (ObservationKind, String) {
        (self.kind, self.content.clone())
    }

    /// String metadata lookup.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetadataValue::as_str)
    }

    /// Numeric metadata lookup.
    pub fn meta_i64(&self, key: &str) -> Option<i64> {
        self.metadata.get(key).and_then(MetadataValue::as_i64)
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ObservationKind::ALL {
            assert_eq!(kind.as_str().parse::<ObservationKind>().unwrap(), kind);
        }
        assert_eq!(
            "shell".parse::<ObservationKind>(),
            Err(ParseKindError("shell".to_string()))
        );
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ObservationKind::FileEdit).unwrap();
        assert_eq!(json, "\"file_edit\"");
    }

    #[test]
    fn test_observation_json_shape() {
        let obs = Observation::new(ObservationKind::ToolUse, "tests: 12 passed, 1 failed")
            .with_meta("tool", "test")
            .with_meta("passed", 12)
            .with_meta("failed", 1);

        let value = serde_json::to_value(&obs).unwrap();
        assert_eq!(value["kind"], "tool_use");
        assert_eq!(value["metadata"]["tool"], "test");
        assert_eq!(value["metadata"]["passed"], 12);

        let back: Observation = serde_json::from_value(value).unwrap();
        assert_eq!(back, obs);
        assert_eq!(back.meta_i64("failed"), Some(1));
        assert_eq!(back.meta_str("passed"), None);
    }

    #[test]
    fn test_empty_metadata_is_omitted() {
        let obs = Observation::new(ObservationKind::Decision, "I'll refactor the parser");
        let json = serde_json::to_string(&obs).unwrap();
        assert!(!json.contains("metadata"));

        let back: Observation = serde_json::from_str(&json).unwrap();
        assert!(back.metadata.is_empty());
    }

    #[test]
    fn test_dedup_key_ignores_metadata() {
        let a = Observation::new(ObservationKind::Command, "git commit abc123: fix bug")
            .with_meta("commitHash", "abc123");
        let b = Observation::new(ObservationKind::Command, "git commit abc123: fix bug");
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let obs = Observation::new(ObservationKind::FileEdit, "file_edit: src/main.rs");
        assert_eq!(obs.to_string(), "[file_edit] file_edit: src/main.rs");
    }
}
