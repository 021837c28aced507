//! ptylens - interpret raw terminal output.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ptylens_cli::commands::{self, ExtractOptions};
use ptylens_cli::config::{Config, OutputFormat};
use ptylens_cli::logging::{self, LogConfig, LogFormat};
use ptylens_types::ObservationKind;
use std::path::PathBuf;

/// Reconstruct terminal screens and mine observations from raw PTY output.
#[derive(Parser, Debug)]
#[command(name = "ptylens")]
#[command(about = "Interpret raw terminal output from coding-agent sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging (INFO level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging (DEBUG level, excludes screen traces)
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable trace logging (TRACE level for everything)
    #[arg(long, global = true)]
    trace: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "miner=debug" or "monitor=trace").
    /// Can be specified multiple times. Targets are prefixed with "ptylens::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL", global = true)]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the screen the input would leave on a terminal
    Render {
        /// Capture files, in order ("-" for stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the observations mined from the input
    Extract {
        /// Capture files, in order ("-" for stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Treat each file as a live chunk instead of one transcript
        #[arg(long)]
        per_chunk: bool,

        /// Drop noise and trivial observations
        #[arg(long)]
        significant: bool,

        /// Only print observations of this kind (repeatable)
        #[arg(long = "kind", value_name = "KIND")]
        kinds: Vec<ObservationKind>,
    },
    /// Print a one-line summary of the significant observations
    Summarize {
        /// Capture files, in order ("-" for stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_cli(
        cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    let (config, source) = Config::load(cli.config.as_deref())?;
    match &source {
        Some(path) => tracing::info!(target: "ptylens::startup", "Loaded configuration from {}", path.display()),
        None => tracing::info!(target: "ptylens::startup", "Using default configuration"),
    }
    let format = cli.format.unwrap_or(config.format);

    let output = match cli.command {
        Command::Render { files } => {
            let inputs = commands::read_inputs(&files)?;
            let screen = commands::render_inputs(&inputs, &config);
            commands::format_screen(&screen, format)?
        }
        Command::Extract {
            files,
            per_chunk,
            significant,
            kinds,
        } => {
            let inputs = commands::read_inputs(&files)?;
            let options = ExtractOptions {
                per_chunk,
                significant,
                kinds,
            };
            let observations = commands::extract_inputs(&inputs, &options, &config);
            commands::format_observations(&observations, format)?
        }
        Command::Summarize { files } => {
            let inputs = commands::read_inputs(&files)?;
            let (summary, observations) = commands::summarize_inputs(&inputs);
            commands::format_summary(&summary, &observations, format)?
        }
    };

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
