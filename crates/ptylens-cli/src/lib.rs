//! ptylens command-line front end.
//!
//! Reads raw PTY captures from files or stdin and prints the reconstructed
//! screen, the mined observations, or a one-line summary. Kept separate from
//! main.rs so the commands can be exercised from tests.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
