//! The `render`, `extract` and `summarize` commands.
//!
//! Each command works on already-read inputs and returns the text to print,
//! so the binary only handles argument parsing and I/O.

use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use ptylens_core::{
    extract_accumulated, filter_significant, summarize, Observation, ObservationKind,
    ScreenBuffer, StreamMonitor,
};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Path that stands for standard input.
pub const STDIN_PATH: &str = "-";

/// Options for the `extract` command.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Mine each input as it arrives instead of the accumulated transcript
    pub per_chunk: bool,
    pub significant: bool,
    /// Keep only these kinds (all kinds when empty)
    pub kinds: Vec<ObservationKind>,
}

/// Read one input file, or stdin for `-`. Invalid UTF-8 is replaced.
pub fn read_input(path: &Path) -> Result<String> {
    let read = if path == Path::new(STDIN_PATH) {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes).map(|_| bytes)
    } else {
        std::fs::read(path)
    };
    let bytes = read.map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(target: "ptylens::cli", "Read {} bytes from {}", bytes.len(), path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read every input in order.
pub fn read_inputs(paths: &[PathBuf]) -> Result<Vec<String>> {
    paths.iter().map(|p| read_input(p)).collect()
}

/// Feed all inputs through one screen and render the result.
pub fn render_inputs(inputs: &[String], config: &Config) -> String {
    let mut screen = ScreenBuffer::with_max_lines(config.max_lines);
    for input in inputs {
        screen.feed(input);
    }
    screen.render()
}

/// Mine observations from the inputs.
pub fn extract_inputs(
    inputs: &[String],
    options: &ExtractOptions,
    config: &Config,
) -> Vec<Observation> {
    let mut observations = if options.per_chunk {
        let mut monitor = StreamMonitor::with_limits(config.max_lines, config.history_max_bytes);
        let mut found = Vec::new();
        for input in inputs {
            let update = monitor.push(input);
            debug!(
                target: "ptylens::cli",
                "Chunk {}: {} new observations",
                update.seq,
                update.observations.len()
            );
            found.extend(update.observations);
        }
        found
    } else {
        extract_accumulated(inputs)
    };

    let total = observations.len();
    if options.significant || config.significant_only {
        observations = filter_significant(observations);
    }
    if !options.kinds.is_empty() {
        observations.retain(|o| options.kinds.contains(&o.kind));
    }

    info!(
        target: "ptylens::cli",
        "Extracted {} observations, {} after filtering",
        total,
        observations.len()
    );
    observations
}

/// Accumulated extraction, significance filter, then summary.
pub fn summarize_inputs(inputs: &[String]) -> (String, Vec<Observation>) {
    let observations = filter_significant(extract_accumulated(inputs));
    (summarize(&observations), observations)
}

pub fn format_screen(screen: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(screen.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({ "screen": screen }))?),
    }
}

/// One `[kind] content` line per observation, or a JSON array.
pub fn format_observations(observations: &[Observation], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(observations
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(observations)?),
    }
}

pub fn format_summary(
    summary: &str,
    observations: &[Observation],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(summary.to_string()),
        OutputFormat::Json => {
            let mut counts = serde_json::Map::new();
            for kind in ObservationKind::ALL {
                let n = observations.iter().filter(|o| o.kind == kind).count();
                if n > 0 {
                    counts.insert(kind.to_string(), json!(n));
                }
            }
            Ok(serde_json::to_string_pretty(&json!({
                "summary": summary,
                "counts": counts,
            }))?)
        }
    }
}
