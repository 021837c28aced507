//! Shared types for the ptylens terminal-output interpretation engine.

mod observation;

pub use observation::*;
