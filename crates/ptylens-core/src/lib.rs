//! Terminal output interpretation for ptylens.
//!
//! Reconstructs what a terminal displayed from raw PTY output and mines the
//! rendered text for structured observations (tool calls, file edits,
//! commands, stated decisions, status messages).

mod ansi;
mod history;
mod miner;
mod monitor;
mod patterns;
mod screen;
mod significance;
mod summary;

pub use ansi::{clean_text, strip_ansi_codes};
pub use history::{ChunkHistory, SequencedChunk, DEFAULT_HISTORY_BYTES};
pub use miner::{extract_accumulated, extract_chunk, match_segment, render_clean};
pub use monitor::{ChunkUpdate, StreamMonitor};
pub use screen::{render, ScreenBuffer, DEFAULT_MAX_LINES};
pub use significance::{filter_significant, is_significant};
pub use summary::{summarize, NO_SIGNIFICANT_OBSERVATIONS};

pub use ptylens_types::{Metadata, MetadataValue, Observation, ObservationKind, ParseKindError};
