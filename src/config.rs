//! Configuration file handling.
//!
//! This module handles loading `.epiglobe.toml` files and merging them
//! with command-line arguments.

use crate::analysis::forecast::DEFAULT_HORIZON_DAYS;
use crate::analysis::views::{DEFAULT_RECENT_DAYS, DEFAULT_TOP_COUNTRIES, DEFAULT_TOP_STATES};
use crate::geo::GlobeConfig;
use crate::synthetic::{default_start, SYNTHETIC_DAYS};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".epiglobe.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Forecast settings.
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Synthetic history settings.
    #[serde(default)]
    pub synthetic: SyntheticConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Globe marker settings.
    #[serde(default)]
    pub globe: GlobeConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "epiglobe_report.md".to_string()
}

/// Forecast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of days to project.
    #[serde(default = "default_horizon")]
    pub horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon(),
        }
    }
}

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_DAYS
}

/// Synthetic history settings, used when no history file is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Seed for the random source.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// First generated day.
    #[serde(default = "default_start")]
    pub start_date: NaiveDate,

    /// Number of generated days.
    #[serde(default = "default_days")]
    pub days: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            start_date: default_start(),
            days: default_days(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_days() -> usize {
    SYNTHETIC_DAYS
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Countries listed in the top countries table.
    #[serde(default = "default_top_countries")]
    pub top_countries: usize,

    /// Days listed in the recent history table.
    #[serde(default = "default_recent_days")]
    pub recent_days: usize,

    /// States listed in the country detail section.
    #[serde(default = "default_top_states")]
    pub top_states: usize,

    /// Include the globe marker table.
    #[serde(default = "default_true")]
    pub include_markers: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_countries: default_top_countries(),
            recent_days: default_recent_days(),
            top_states: default_top_states(),
            include_markers: true,
        }
    }
}

fn default_top_countries() -> usize {
    DEFAULT_TOP_COUNTRIES
}

fn default_recent_days() -> usize {
    DEFAULT_RECENT_DAYS
}

fn default_top_states() -> usize {
    DEFAULT_TOP_STATES
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(horizon) = args.horizon {
            self.forecast.horizon_days = horizon;
        }
        if let Some(seed) = args.seed {
            self.synthetic.seed = seed;
        }
        if let Some(top) = args.top {
            self.report.top_countries = top;
        }
        if args.no_markers {
            self.report.include_markers = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
