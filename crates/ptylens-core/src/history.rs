//! Bounded, sequenced history of raw output chunks.
//!
//! Holds the raw text a stream produced so it can be replayed through
//! [`crate::extract_accumulated`]. Sequence numbers are contiguous within the
//! retained window, so lookups are index arithmetic rather than scans.

use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default byte budget for a stream's history (512KB).
pub const DEFAULT_HISTORY_BYTES: usize = 512 * 1024;

/// A single sequenced chunk of raw output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedChunk {
    pub seq: u64,
    /// Raw text including escape sequences
    pub data: String,
    /// Capture time (ms since Unix epoch)
    pub timestamp_ms: u64,
}

/// Chunks kept oldest-first under a byte budget. The newest chunk is always
/// retained, even when it alone exceeds the budget.
#[derive(Debug)]
pub struct ChunkHistory {
    window: VecDeque<SequencedChunk>,
    /// Sequence number the next pushed chunk receives
    next_seq: u64,
    bytes: usize,
    budget: usize,
}

impl Default for ChunkHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_BYTES)
    }
}

impl ChunkHistory {
    pub fn new(budget: usize) -> Self {
        Self {
            window: VecDeque::new(),
            next_seq: 0,
            bytes: 0,
            budget,
        }
    }

    /// Record `data`, returning its sequence number and how many older chunks
    /// were dropped to stay within budget.
    pub fn push(&mut self, data: &str) -> (u64, u32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.bytes += data.len();
        self.window.push_back(SequencedChunk {
            seq,
            data: data.to_string(),
            timestamp_ms: now_ms(),
        });
        (seq, self.shrink_to_budget())
    }

    fn shrink_to_budget(&mut self) -> u32 {
        let mut dropped = 0;
        while self.bytes > self.budget && self.window.len() > 1 {
            let Some(oldest) = self.window.pop_front() else {
                break;
            };
            self.bytes -= oldest.data.len();
            dropped += 1;
        }
        dropped
    }

    /// Raw text of every retained chunk, oldest first, ready for replay.
    pub fn texts(&self) -> Vec<&str> {
        self.window.iter().map(|c| c.data.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SequencedChunk> {
        self.window.iter()
    }

    /// Retained chunks whose sequence numbers fall in `seqs`.
    pub fn range(&self, seqs: RangeInclusive<u64>) -> impl Iterator<Item = &SequencedChunk> {
        let first = self.start_seq();
        let skip = seqs.start().saturating_sub(first) as usize;
        let take = seqs
            .end()
            .checked_sub(first.max(*seqs.start()))
            .map_or(0, |span| (span as usize).saturating_add(1));
        self.window.iter().skip(skip).take(take)
    }

    /// Sequence number of the oldest retained chunk, or of the next chunk
    /// when nothing is retained.
    pub fn start_seq(&self) -> u64 {
        self.window.front().map_or(self.next_seq, |c| c.seq)
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn has_seq(&self, seq: u64) -> bool {
        (self.start_seq()..self.next_seq).contains(&seq)
    }

    pub fn total_bytes(&self) -> usize {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Drop every chunk. Numbering continues from where it was.
    pub fn clear(&mut self) {
        self.window.clear();
        self.bytes = 0;
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seqs<'a>(chunks: impl Iterator<Item = &'a SequencedChunk>) -> Vec<u64> {
        chunks.map(|c| c.seq).collect()
    }

    #[test]
    fn test_push_assigns_sequences() {
        let mut history = ChunkHistory::new(1024);
        assert_eq!(history.push("a"), (0, 0));
        assert_eq!(history.push("b"), (1, 0));
        assert_eq!(history.start_seq(), 0);
        assert_eq!(history.next_seq(), 2);
        assert_eq!(history.texts(), vec!["a", "b"]);
    }

    #[test]
    fn test_eviction_by_bytes() {
        let mut history = ChunkHistory::new(10);
        history.push("12345");
        history.push("67890");
        let (seq, evicted) = history.push("abc");
        assert_eq!(seq, 2);
        assert_eq!(evicted, 1);
        assert_eq!(history.start_seq(), 1);
        assert_eq!(history.total_bytes(), 8);
        assert!(!history.has_seq(0));
        assert!(history.has_seq(2));
        assert_eq!(history.texts(), vec!["67890", "abc"]);
    }

    #[test]
    fn test_newest_chunk_never_evicted() {
        let mut history = ChunkHistory::new(4);
        history.push("ab");
        let (_, evicted) = history.push("this is far larger than the budget");
        assert_eq!(evicted, 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.start_seq(), 1);
    }

    #[test]
    fn test_range() {
        let mut history = ChunkHistory::new(1024);
        for s in ["a", "b", "c", "d"] {
            history.push(s);
        }
        assert_eq!(seqs(history.range(1..=2)), vec![1, 2]);
        assert_eq!(seqs(history.range(2..=99)), vec![2, 3]);
        assert_eq!(seqs(history.range(3..=1)), Vec::<u64>::new());
    }

    #[test]
    fn test_range_after_eviction() {
        let mut history = ChunkHistory::new(2);
        for s in ["a", "b", "c", "d"] {
            history.push(s);
        }
        assert_eq!(history.start_seq(), 2);
        assert_eq!(seqs(history.range(0..=2)), vec![2]);
        assert_eq!(seqs(history.range(0..=1)), Vec::<u64>::new());
        assert_eq!(seqs(history.iter()), vec![2, 3]);
    }

    #[test]
    fn test_clear_keeps_sequences_monotonic() {
        let mut history = ChunkHistory::new(1024);
        history.push("a");
        history.push("b");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.start_seq(), 2);
        assert_eq!(history.push("c").0, 2);
        assert_eq!(history.start_seq(), 2);
    }

    #[test]
    fn test_empty_history() {
        let history = ChunkHistory::default();
        assert_eq!(history.next_seq(), 0);
        assert!(!history.has_seq(0));
        assert!(history.texts().is_empty());
    }
}
