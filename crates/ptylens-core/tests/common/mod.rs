//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

/// Load a raw PTY capture from the fixtures directory.
pub fn load_capture(name: &str) -> String {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.txt", name));

    std::fs::read_to_string(&fixture_path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", fixture_path.display(), e))
}

/// Split a capture into chunks at every CRLF, keeping the terminator with
/// the chunk it ends, the way a PTY reader typically delivers lines.
pub fn capture_lines(capture: &str) -> Vec<String> {
    capture.split_inclusive("\r\n").map(str::to_string).collect()
}

/// Contents of every observation, in order.
pub fn contents(observations: &[ptylens_core::Observation]) -> Vec<&str> {
    observations.iter().map(|o| o.content.as_str()).collect()
}
