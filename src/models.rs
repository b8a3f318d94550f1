//! Data models for the dashboard pipeline.
//!
//! This module contains the raw record type read from uploads and the
//! derived summaries, time series and forecast points that the renderers
//! consume. Every derived value is an immutable snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw observation of counts for a country (optionally a state) on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Country name, matched exactly and case-sensitively.
    pub country: String,
    /// Sub-national region, when the row is state-level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Observation date.
    pub date: NaiveDate,
    #[serde(default)]
    pub total_cases: u64,
    #[serde(default)]
    pub active_cases: u64,
    #[serde(default)]
    pub recovered: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub vaccinated: u64,
    #[serde(default)]
    pub population: u64,
}

impl RawRecord {
    /// Creates a record with every counter set to zero.
    pub fn new(country: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            country: country.into(),
            state: None,
            date,
            total_cases: 0,
            active_cases: 0,
            recovered: 0,
            deaths: 0,
            vaccinated: 0,
            population: 0,
        }
    }

    /// Returns the six counters of this record as a [`Totals`].
    pub fn totals(&self) -> Totals {
        Totals {
            total_cases: self.total_cases,
            active_cases: self.active_cases,
            recovered: self.recovered,
            deaths: self.deaths,
            vaccinated: self.vaccinated,
            population: self.population,
        }
    }
}

/// The six summed counters shared by every summary level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_cases: u64,
    pub active_cases: u64,
    pub recovered: u64,
    pub deaths: u64,
    pub vaccinated: u64,
    pub population: u64,
}

impl Totals {
    /// Fold step: returns a new accumulator with the record's counters added.
    #[must_use]
    pub fn add(self, record: &RawRecord) -> Self {
        self.merge(record.totals())
    }

    /// Field-wise sum of two accumulators.
    #[must_use]
    pub fn merge(self, other: Totals) -> Self {
        Self {
            total_cases: self.total_cases.saturating_add(other.total_cases),
            active_cases: self.active_cases.saturating_add(other.active_cases),
            recovered: self.recovered.saturating_add(other.recovered),
            deaths: self.deaths.saturating_add(other.deaths),
            vaccinated: self.vaccinated.saturating_add(other.vaccinated),
            population: self.population.saturating_add(other.population),
        }
    }

    /// Sums the counters of every record.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a RawRecord>) -> Self {
        records.into_iter().fold(Self::default(), Self::add)
    }

    /// Percentage of the population vaccinated, 0 when population is 0.
    pub fn vaccination_rate(&self) -> f64 {
        vaccination_rate(self.vaccinated, self.population)
    }
}

/// `vaccinated / population * 100`, defined as 0 for an empty population.
pub fn vaccination_rate(vaccinated: u64, population: u64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    (vaccinated as f64 / population as f64) * 100.0
}

/// Direction of a country's recent case trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

impl TrendDirection {
    /// Returns an arrow for tables.
    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Up => "↑",
            TrendDirection::Down => "↓",
            TrendDirection::Stable => "→",
        }
    }
}

/// Coarse week-over-week classification with the percent change behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Absolute percent change, never negative.
    pub magnitude: f64,
}

impl Trend {
    pub const STABLE: Trend = Trend {
        direction: TrendDirection::Stable,
        magnitude: 0.0,
    };
}

/// Per-state view built from a single state-tagged record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub state: String,
    pub total_cases: u64,
    pub active_cases: u64,
    pub recovered: u64,
    pub deaths: u64,
    pub vaccinated: u64,
    pub population: u64,
}

impl StateSummary {
    /// Population assumed for a state row that reports none.
    pub const PLACEHOLDER_POPULATION: u64 = 100_000;

    /// Builds the summary for a record, returning `None` when it has no state tag.
    ///
    /// An empty tag counts as no tag.
    pub fn from_record(record: &RawRecord) -> Option<Self> {
        let state = record.state.as_deref().filter(|s| !s.is_empty())?;
        Some(Self {
            state: state.to_string(),
            total_cases: record.total_cases,
            active_cases: record.active_cases,
            recovered: record.recovered,
            deaths: record.deaths,
            vaccinated: record.vaccinated,
            population: if record.population == 0 {
                Self::PLACEHOLDER_POPULATION
            } else {
                record.population
            },
        })
    }

    pub fn vaccination_rate(&self) -> f64 {
        vaccination_rate(self.vaccinated, self.population)
    }
}

/// Aggregated view of one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub country: String,
    pub total_cases: u64,
    pub active_cases: u64,
    pub recovered: u64,
    pub deaths: u64,
    pub vaccinated: u64,
    pub population: u64,
    pub vaccination_rate: f64,
    pub trend: Trend,
    pub latitude: f64,
    pub longitude: f64,
    /// Present only when at least one record carried a state tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<StateSummary>>,
}

impl CountrySummary {
    /// Returns the summed counters of this country.
    pub fn totals(&self) -> Totals {
        Totals {
            total_cases: self.total_cases,
            active_cases: self.active_cases,
            recovered: self.recovered,
            deaths: self.deaths,
            vaccinated: self.vaccinated,
            population: self.population,
        }
    }

    /// Number of state rows, 0 when there is no breakdown.
    pub fn state_count(&self) -> usize {
        self.states.as_ref().map_or(0, Vec::len)
    }
}

/// Sums across every record in the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSummary {
    pub total_cases: u64,
    pub active_cases: u64,
    pub recovered: u64,
    pub deaths: u64,
    pub vaccinated: u64,
    pub population: u64,
    pub vaccination_rate: f64,
}

impl From<Totals> for GlobalSummary {
    fn from(totals: Totals) -> Self {
        Self {
            total_cases: totals.total_cases,
            active_cases: totals.active_cases,
            recovered: totals.recovered,
            deaths: totals.deaths,
            vaccinated: totals.vaccinated,
            population: totals.population,
            vaccination_rate: totals.vaccination_rate(),
        }
    }
}

/// One historical day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    #[serde(default)]
    pub cases: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub recovered: u64,
    #[serde(default)]
    pub vaccinated: u64,
}

/// One projected day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_cases: u64,
    pub predicted_deaths: u64,
    pub predicted_vaccinated: u64,
    pub lower_bound: u64,
    pub upper_bound: u64,
}

/// Everything the renderers need for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    pub global: GlobalSummary,
    pub countries: Vec<CountrySummary>,
    pub time_series: Vec<DailyPoint>,
    pub predictions: Vec<ForecastPoint>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Where the records came from (a file path or the demo dataset).
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Records accepted from the input.
    pub records_loaded: usize,
    /// Input rows dropped as unusable.
    pub records_skipped: usize,
    /// Where the daily history came from.
    pub history_source: String,
    /// Seed of the synthetic data, if any was generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Number of forecast days requested.
    pub horizon_days: u32,
}

/// A complete dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub metadata: ReportMetadata,
    pub data: ProcessedData,
    /// Globe markers, one per country.
    #[serde(default)]
    pub markers: Vec<crate::geo::GlobeMarker>,
}
