//! End-to-end extraction over recorded PTY captures.

mod common;

use common::{capture_lines, contents, load_capture};
use ptylens_core::{
    extract_accumulated, extract_chunk, filter_significant, render, summarize, ObservationKind,
    StreamMonitor,
};

#[test]
fn test_session_renders_final_screen() {
    let screen = render(&load_capture("session"));
    let lines: Vec<&str> = screen.lines().collect();

    assert_eq!(
        lines[0],
        "● I'll start by updating the session store to persist chunks."
    );
    assert_eq!(lines[1], "");
    assert_eq!(
        lines[5],
        "  ⎿  test result: ok. 14 passed; 0 failed; 0 ignored"
    );
    assert!(!screen.contains('\x1b'));
    assert!(!screen.contains("Running tests"));
    assert!(!screen.contains("claude"));
}

#[test]
fn test_session_accumulated_extraction() {
    let observations = extract_accumulated(&[load_capture("session")]);

    assert_eq!(
        contents(&observations),
        vec![
            "I'll start by updating the session store to persist chunks",
            "file_read: crates/store/src/lib.rs",
            "file_edit: crates/store/src/lib.rs",
            "bash_command: cargo test -p store",
            "bash_output: test result: ok. 14 passed; 0 failed; 0 ignored",
            "bash_command: git commit -a",
            "bash_output: [main 4e5f6a7] Persist chunks",
            "git commit 4e5f6a7: Persist chunks",
            "tests: 14 passed, 0 failed",
        ]
    );

    let commit = &observations[7];
    assert_eq!(commit.kind, ObservationKind::Command);
    assert_eq!(commit.meta_str("branch"), Some("main"));
    assert_eq!(commit.meta_str("commitHash"), Some("4e5f6a7"));
}

#[test]
fn test_session_chunking_does_not_change_accumulated_result() {
    let capture = load_capture("session");
    let whole = extract_accumulated(&[capture.clone()]);
    let chunked = extract_accumulated(&capture_lines(&capture));
    assert_eq!(whole, chunked);
}

#[test]
fn test_session_significance_and_summary() {
    let observations = filter_significant(extract_accumulated(&[load_capture("session")]));

    assert!(observations.iter().all(|o| !o.content.starts_with("file_read:")));
    // Both `bash_output:` lines are commands alongside the two `Bash(...)`
    // calls and the git commit.
    let commands = observations
        .iter()
        .filter(|o| o.kind == ObservationKind::Command)
        .count();
    assert_eq!(commands, 5);
    assert_eq!(
        summarize(&observations),
        "Files edited: 1, Commands run: 5, Decisions made: 1"
    );
}

#[test]
fn test_session_stream_monitor() {
    let capture = load_capture("session");
    let mut monitor = StreamMonitor::new();

    let mut live = Vec::new();
    for chunk in capture_lines(&capture) {
        live.extend(monitor.push(&chunk).observations);
    }

    // Per-chunk mining sees every single-line pattern exactly once.
    assert!(live.iter().any(|o| o.content == "file_edit: crates/store/src/lib.rs"));
    assert!(live.iter().any(|o| o.kind == ObservationKind::Decision));
    // Transcript-level scans only run on replay.
    assert!(live.iter().all(|o| o.meta_str("tool") != Some("git_commit")));

    let replayed = monitor.replay();
    assert!(replayed.iter().any(|o| o.meta_str("tool") == Some("git_commit")));
    assert!(replayed.iter().any(|o| o.meta_str("tool") == Some("test")));

    assert_eq!(monitor.screen(), render(&capture));
}

#[test]
fn test_redraw_keeps_only_final_frame() {
    let capture = load_capture("redraw");
    assert_eq!(
        render(&capture),
        "✔ Successfully installed 42 packages\n$ npm install zod"
    );
}

#[test]
fn test_redraw_extraction() {
    let capture = load_capture("redraw");

    let single = extract_chunk(&capture);
    assert!(single
        .iter()
        .any(|o| o.content == "success: Successfully installed 42 packages"));
    assert!(single.iter().all(|o| !o.content.contains('%')));

    let observations = extract_accumulated(&[capture]);
    let install = observations
        .iter()
        .find(|o| o.meta_str("tool") == Some("package_install"))
        .expect("package install observation");
    assert_eq!(install.content, "npm install zod");
    assert_eq!(install.meta_str("target"), Some("zod"));
    assert!(observations
        .iter()
        .any(|o| o.content == "bash_command: npm install zod"));
}
