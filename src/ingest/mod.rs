//! Loading records and daily history from uploaded files.
//!
//! Uploads are best-effort: numeric columns that are missing, empty or
//! unparseable count as 0, and rows without a usable country or date are
//! skipped with a warning. Only an unreadable or structurally broken file
//! is an error.

mod lenient;

use crate::models::{DailyPoint, RawRecord};
use lenient::{lenient_count, parse_date};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while loading an upload.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot infer input format from {}; expected a .csv or .json file", .0.display())]
    UnknownFormat(PathBuf),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON input must be an array of objects")]
    NotAnArray,
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn resolve(format: Option<Self>, path: &Path) -> Result<Self> {
        format
            .or_else(|| Self::from_path(path))
            .ok_or_else(|| IngestError::UnknownFormat(path.to_path_buf()))
    }
}

/// Rows accepted from an upload plus how many were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Loaded<T> {
    fn from_rows<R>(rows: impl IntoIterator<Item = Option<R>>, convert: impl Fn(R) -> Option<T>) -> Self {
        let mut items = Vec::new();
        let mut skipped = 0;
        for row in rows {
            match row.and_then(&convert) {
                Some(item) => items.push(item),
                None => skipped += 1,
            }
        }
        Self { items, skipped }
    }
}

/// One upload row before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RecordRow {
    country: Option<String>,
    state: Option<String>,
    date: Option<String>,
    #[serde(alias = "total_cases", alias = "cases", deserialize_with = "lenient_count")]
    total_cases: u64,
    #[serde(alias = "active_cases", alias = "active", deserialize_with = "lenient_count")]
    active_cases: u64,
    #[serde(deserialize_with = "lenient_count")]
    recovered: u64,
    #[serde(deserialize_with = "lenient_count")]
    deaths: u64,
    #[serde(deserialize_with = "lenient_count")]
    vaccinated: u64,
    #[serde(deserialize_with = "lenient_count")]
    population: u64,
}

impl RecordRow {
    fn into_record(self) -> Option<RawRecord> {
        let country = self.country.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        let Some(country) = country else {
            warn!("Skipping row without a country");
            return None;
        };

        let Some(date) = self.date.as_deref().and_then(parse_date) else {
            warn!(
                "Skipping {} row with missing or invalid date {:?}",
                country, self.date
            );
            return None;
        };

        Some(RawRecord {
            country,
            state: self.state.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            date,
            total_cases: self.total_cases,
            active_cases: self.active_cases,
            recovered: self.recovered,
            deaths: self.deaths,
            vaccinated: self.vaccinated,
            population: self.population,
        })
    }
}

/// One history row before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HistoryRow {
    date: Option<String>,
    #[serde(alias = "totalCases", alias = "total_cases", deserialize_with = "lenient_count")]
    cases: u64,
    #[serde(deserialize_with = "lenient_count")]
    deaths: u64,
    #[serde(deserialize_with = "lenient_count")]
    recovered: u64,
    #[serde(deserialize_with = "lenient_count")]
    vaccinated: u64,
}

impl HistoryRow {
    fn into_point(self) -> Option<DailyPoint> {
        let Some(date) = self.date.as_deref().and_then(parse_date) else {
            warn!("Skipping history row with missing or invalid date {:?}", self.date);
            return None;
        };
        Some(DailyPoint {
            date,
            cases: self.cases,
            deaths: self.deaths,
            recovered: self.recovered,
            vaccinated: self.vaccinated,
        })
    }
}

/// Load raw records from a CSV or JSON file.
pub fn load_records(path: &Path, format: Option<InputFormat>) -> Result<Loaded<RawRecord>> {
    let format = InputFormat::resolve(format, path)?;
    info!("Loading records from {} ({:?})", path.display(), format);

    let loaded = read_records(open(path)?, format)?;
    log_loaded("records", &loaded);
    Ok(loaded)
}

/// Parse raw records from any reader.
pub fn read_records<R: Read>(reader: R, format: InputFormat) -> Result<Loaded<RawRecord>> {
    let rows = read_rows::<RecordRow, R>(reader, format)?;
    Ok(Loaded::from_rows(rows, RecordRow::into_record))
}

/// Load a daily history from a CSV or JSON file, ordered by date.
pub fn load_history(path: &Path, format: Option<InputFormat>) -> Result<Loaded<DailyPoint>> {
    let format = InputFormat::resolve(format, path)?;
    info!("Loading history from {} ({:?})", path.display(), format);

    let loaded = read_history(open(path)?, format)?;
    log_loaded("history points", &loaded);
    Ok(loaded)
}

/// Parse a daily history from any reader, ordered by date.
pub fn read_history<R: Read>(reader: R, format: InputFormat) -> Result<Loaded<DailyPoint>> {
    let rows = read_rows::<HistoryRow, R>(reader, format)?;
    let mut loaded = Loaded::from_rows(rows, HistoryRow::into_point);

    if !loaded.items.windows(2).all(|w| w[0].date <= w[1].date) {
        debug!("History rows out of order, sorting by date");
        loaded.items.sort_by_key(|p| p.date);
    }

    Ok(loaded)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Deserialize every row, mapping rows that fail to `None`.
fn read_rows<T: DeserializeOwned, R: Read>(reader: R, format: InputFormat) -> Result<Vec<Option<T>>> {
    match format {
        InputFormat::Csv => {
            let mut csv_reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .flexible(true)
                .from_reader(reader);

            Ok(csv_reader
                .deserialize::<T>()
                .enumerate()
                .map(|(i, row)| {
                    row.map_err(|e| warn!("Skipping CSV row {}: {}", i + 1, e))
                        .ok()
                })
                .collect())
        }
        InputFormat::Json => {
            let value: serde_json::Value = serde_json::from_reader(reader)?;
            let serde_json::Value::Array(rows) = value else {
                return Err(IngestError::NotAnArray);
            };

            Ok(rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| {
                    serde_json::from_value::<T>(row)
                        .map_err(|e| warn!("Skipping JSON row {}: {}", i, e))
                        .ok()
                })
                .collect())
        }
    }
}

fn log_loaded<T>(what: &str, loaded: &Loaded<T>) {
    if loaded.skipped > 0 {
        warn!(
            "Loaded {} {}, skipped {} unusable rows",
            loaded.items.len(),
            what,
            loaded.skipped
        );
    } else {
        info!("Loaded {} {}", loaded.items.len(), what);
    }
}
