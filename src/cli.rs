//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation.

use crate::ingest::InputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Longest forecast the CLI accepts.
pub const MAX_HORIZON_DAYS: u32 = 3650;

/// epiglobe - epidemic dashboard data builder
///
/// Aggregates case, death and vaccination records into country and global
/// summaries, projects a forecast, and writes a Markdown or JSON report
/// with everything the globe and chart views need.
///
/// Examples:
///   epiglobe
///   epiglobe --input records.csv --country "United States"
///   epiglobe --input records.json --history history.csv --horizon 30
///   epiglobe --input records.csv --format json --output -
///   epiglobe --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Records file to aggregate (.csv or .json)
    ///
    /// Without an input the generated demo dataset is used.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Format of the records file, when the extension does not tell
    #[arg(long, value_name = "FORMAT")]
    pub input_format: Option<InputFormat>,

    /// Daily history file to forecast from (.csv or .json)
    ///
    /// Without a history file a seeded synthetic history is generated.
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Format of the history file, when the extension does not tell
    #[arg(long, value_name = "FORMAT")]
    pub history_format: Option<InputFormat>,

    /// Seed for the synthetic history and demo dataset
    #[arg(long, value_name = "SEED", env = "EPIGLOBE_SEED")]
    pub seed: Option<u64>,

    /// Number of days to forecast
    #[arg(long, value_name = "DAYS")]
    pub horizon: Option<u32>,

    /// Country to include a detailed section for
    #[arg(short = 'n', long, value_name = "NAME")]
    pub country: Option<String>,

    /// Number of countries in the top countries table
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Leave the globe marker table out of the report
    #[arg(long)]
    pub no_markers: bool,

    /// Output file path for the report, or - for stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .epiglobe.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .epiglobe.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(horizon) = self.horizon {
            if horizon > MAX_HORIZON_DAYS {
                return Err(format!(
                    "Horizon must be at most {} days",
                    MAX_HORIZON_DAYS
                ));
            }
        }

        if self.top == Some(0) {
            return Err("Top countries must be at least 1".to_string());
        }

        for (flag, path) in [("--input", &self.input), ("--history", &self.history)] {
            if let Some(path) = path {
                if !path.is_file() {
                    return Err(format!("{} file does not exist: {}", flag, path.display()));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// True when the report goes to stdout.
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_deref().is_some_and(|p| p.as_os_str() == "-")
    }
}
