//! Incremental, per-stream observation tracking.
//!
//! A [`StreamMonitor`] is fed raw PTY chunks as they arrive. Each chunk is
//! recorded in a bounded [`ChunkHistory`], advances a live [`ScreenBuffer`],
//! and is mined on its own; only observations not already reported within
//! the retained history are returned.
//!
//! The reported set follows the history window: a key is forgotten once the
//! chunk that introduced it is evicted, so memory stays bounded by the
//! history budget on long-running streams.

use crate::history::{ChunkHistory, DEFAULT_HISTORY_BYTES};
use crate::miner::{extract_accumulated, extract_chunk};
use crate::screen::{ScreenBuffer, DEFAULT_MAX_LINES};
use ptylens_types::{Observation, ObservationKind};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Result of pushing one chunk into a [`StreamMonitor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkUpdate {
    /// Sequence number assigned to the chunk
    pub seq: u64,
    /// Number of older chunks evicted from history
    pub evicted: u32,
    /// Observations first seen in this chunk
    pub observations: Vec<Observation>,
}

/// Incremental state for a single output stream.
#[derive(Debug)]
pub struct StreamMonitor {
    screen: ScreenBuffer,
    history: ChunkHistory,
    reported: HashSet<DedupKey>,
    /// Keys first reported by each retained chunk, oldest first
    introduced: VecDeque<(u64, Vec<DedupKey>)>,
}

type DedupKey = (ObservationKind, String);

impl Default for StreamMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamMonitor {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_LINES, DEFAULT_HISTORY_BYTES)
    }

    /// Monitor with a custom screen row bound and history byte budget.
    pub fn with_limits(max_lines: usize, history_max_bytes: usize) -> Self {
        Self {
            screen: ScreenBuffer::with_max_lines(max_lines),
            history: ChunkHistory::new(history_max_bytes),
            reported: HashSet::new(),
            introduced: VecDeque::new(),
        }
    }

    /// Record a chunk and return the observations it introduced.
    pub fn push(&mut self, chunk: &str) -> ChunkUpdate {
        let (seq, evicted) = self.history.push(chunk);
        self.screen.feed(chunk);

        if evicted > 0 {
            let forgotten = self.forget_before(self.history.start_seq());
            debug!(
                target: "ptylens::monitor",
                "Evicted {} chunks ({} reported keys forgotten), history now starts at seq {}",
                evicted,
                forgotten,
                self.history.start_seq()
            );
        }

        let observations: Vec<Observation> = extract_chunk(chunk)
            .into_iter()
            .filter(|obs| self.reported.insert(obs.owned_key()))
            .collect();
        if !observations.is_empty() {
            let keys = observations.iter().map(Observation::owned_key).collect();
            self.introduced.push_back((seq, keys));
            debug!(
                target: "ptylens::monitor",
                "Chunk {} produced {} new observations",
                seq,
                observations.len()
            );
        }

        ChunkUpdate {
            seq,
            evicted,
            observations,
        }
    }

    /// Render the live screen.
    pub fn screen(&self) -> String {
        self.screen.render()
    }

    /// Re-mine everything still held in history as one accumulated pass.
    pub fn replay(&self) -> Vec<Observation> {
        extract_accumulated(&self.history.texts())
    }

    pub fn history(&self) -> &ChunkHistory {
        &self.history
    }

    /// Number of distinct observations currently remembered as reported.
    pub fn reported_count(&self) -> usize {
        self.reported.len()
    }

    /// Drop reported keys introduced by chunks older than `start_seq`.
    fn forget_before(&mut self, start_seq: u64) -> usize {
        let mut forgotten = 0;
        while self
            .introduced
            .front()
            .is_some_and(|(seq, _)| *seq < start_seq)
        {
            if let Some((_, keys)) = self.introduced.pop_front() {
                for key in keys {
                    forgotten += usize::from(self.reported.remove(&key));
                }
            }
        }
        forgotten
    }

    /// Clear the screen, history data and reported set.
    /// Sequence numbers keep increasing across resets.
    pub fn reset(&mut self) {
        self.screen.reset();
        self.history.clear();
        self.reported.clear();
        self.introduced.clear();
        debug!(target: "ptylens::monitor", "Stream monitor reset");
    }
}
