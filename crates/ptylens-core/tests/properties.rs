//! Property tests for the screen buffer and the observation pipeline.

use proptest::prelude::*;
use ptylens_core::{
    extract_accumulated, filter_significant, is_significant, render, summarize, ScreenBuffer,
};
use std::collections::HashSet;

/// Fragments that exercise cursor movement, erasure, truncated sequences
/// and plain text in arbitrary combinations.
fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "a", "bc", "xyz", " ", "\r", "\n", "\r\n", "\t", "\x08", "\x07", "\x1b", "\x1b[", "\x1b]",
        "[", "]", "2", ";", "99", "A", "B", "C", "D", "H", "J", "K", "G", "E", "F", "m",
        "\x1b[2J", "\x1b[999B", "\x1b[3;4H", "\x1b[5A", "\x1b[K", "[2K", "\x1b]0;t\x07",
        "\x1b[99999999999999999999C",
    ])
}

fn raw_stream() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..200).prop_map(|parts| parts.concat())
}

/// Text that may contain pattern-like phrases.
fn transcript_fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "● Bash(cargo test)\n",
        "● Update(src/lib.rs)\n",
        "● Read(src/main.rs)\n",
        "I'll restructure the parsing module.\n",
        "Let me check.\n",
        "[main abc1234] Fix things\n",
        "error: something broke badly\n",
        "npm install left-pad\n",
        "3 passed, 1 failed\n",
        "$ ls\n",
        "\x1b[2K\r",
        "\x1b[1A",
        "plain output line\n",
        "\n\n\n\n",
    ])
}

proptest! {
    #[test]
    fn screen_invariants_hold(raw in raw_stream(), max_lines in 1usize..8) {
        let mut buffer = ScreenBuffer::with_max_lines(max_lines);
        let rendered = buffer.process(&raw);

        let (row, _) = buffer.cursor();
        prop_assert!(buffer.line_count() >= 1);
        prop_assert!(buffer.line_count() <= max_lines);
        prop_assert!(row < buffer.line_count());
        prop_assert!(!rendered.contains('\x1b'));
    }

    #[test]
    fn split_input_matches_whole_input(raw in raw_stream(), split in 0usize..400) {
        // Splitting anywhere before the first escape or bracket must not
        // change the result.
        let chars: Vec<char> = raw.chars().collect();
        let limit = chars
            .iter()
            .position(|c| *c == '\x1b' || *c == '[')
            .unwrap_or(chars.len());
        let at = split.min(limit);

        let head: String = chars[..at].iter().collect();
        let tail: String = chars[at..].iter().collect();

        let mut buffer = ScreenBuffer::new();
        buffer.feed(&head);
        buffer.feed(&tail);
        prop_assert_eq!(buffer.render(), render(&raw));
    }

    #[test]
    fn render_is_idempotent_on_plain_text(lines in prop::collection::vec("[a-zA-Z0-9.,:!? ]{0,40}", 0..10)) {
        let text = lines.join("\n");
        let once = render(&text);
        prop_assert_eq!(render(&once), once);
    }

    #[test]
    fn plain_line_renders_unchanged(line in "[a-z0-9.,:!?]([a-z0-9 .,:!?]{0,40}[a-z0-9.,:!?])?") {
        prop_assert_eq!(render(&line), line);
    }

    #[test]
    fn accumulated_observations_are_unique(chunks in prop::collection::vec(transcript_fragment(), 0..30)) {
        let observations = extract_accumulated(&chunks);
        let mut seen = HashSet::new();
        for obs in &observations {
            prop_assert!(seen.insert(obs.owned_key()), "duplicate {:?}", obs);
        }
    }

    #[test]
    fn significance_filter_is_consistent(chunks in prop::collection::vec(transcript_fragment(), 0..30)) {
        let observations = extract_accumulated(&chunks);
        let expected: Vec<_> = observations.iter().filter(|o| is_significant(o)).cloned().collect();
        let kept = filter_significant(observations);
        prop_assert_eq!(&kept, &expected);
        prop_assert!(!summarize(&kept).is_empty());
    }
}
