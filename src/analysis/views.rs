//! Chart-ready selections over a processed snapshot.
//!
//! These are the read-only slices the dashboard charts draw from. None of
//! them mutate the snapshot; sorted views work on copies.

use crate::models::{
    CountrySummary, DailyPoint, ForecastPoint, GlobalSummary, ProcessedData, StateSummary,
};
use serde::{Deserialize, Serialize};

/// Countries shown in the "top countries" bar chart.
pub const DEFAULT_TOP_COUNTRIES: usize = 10;

/// Days shown in the recent trend charts.
pub const DEFAULT_RECENT_DAYS: usize = 60;

/// States listed in the country detail panel.
pub const DEFAULT_TOP_STATES: usize = 5;

/// Index of the 30-day projection in a forecast.
const THIRTY_DAY_INDEX: usize = 29;

/// One slice of the global case distribution pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub name: &'static str,
    pub value: u64,
    /// Fraction of the pie, in [0, 1].
    pub share: f64,
    pub color: &'static str,
}

/// One bar in the state detail chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRow {
    pub name: String,
    pub cases: u64,
    pub deaths: u64,
    pub recovered: u64,
    pub vaccinated: u64,
    pub vaccination_rate: f64,
}

impl From<&StateSummary> for StateRow {
    fn from(state: &StateSummary) -> Self {
        Self {
            name: state.state.clone(),
            cases: state.total_cases,
            deaths: state.deaths,
            recovered: state.recovered,
            vaccinated: state.vaccinated,
            vaccination_rate: state.vaccination_rate(),
        }
    }
}

/// Headline numbers for the predictions panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPredictions {
    /// Projected cases 30 days out, 0 if the forecast is shorter.
    pub thirty_day_cases: u64,
    pub thirty_day_lower: u64,
    pub thirty_day_upper: u64,
    /// Projected vaccinations at the end of the horizon.
    pub final_vaccinated: u64,
}

/// Format a number in en-US compact notation with at most one fraction digit.
///
/// `999` stays as is, `1234` becomes `1.2K`, `1_500_000` becomes `1.5M`.
pub fn format_compact(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    if !value.is_finite() {
        return value.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    let mut unit = UNITS.iter().position(|(scale, _)| abs >= *scale);
    let mut scaled = round_one(unit.map_or(abs, |i| abs / UNITS[i].0));

    // 999_950 rounds to 1000.0K, which reads as 1M.
    if scaled >= 1000.0 {
        match unit {
            Some(0) => {}
            Some(i) => {
                unit = Some(i - 1);
                scaled = round_one(abs / UNITS[i - 1].0);
            }
            None => {
                unit = Some(UNITS.len() - 1);
                scaled = round_one(abs / UNITS[UNITS.len() - 1].0);
            }
        }
    }

    let suffix = unit.map_or("", |i| UNITS[i].1);
    let number = if scaled.fract() == 0.0 {
        format!("{}", scaled as u64)
    } else {
        format!("{:.1}", scaled)
    };

    format!("{}{}{}", sign, number, suffix)
}

fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The `n` countries with the most cases, largest first.
///
/// Ties keep their original order.
pub fn top_countries(countries: &[CountrySummary], n: usize) -> Vec<&CountrySummary> {
    let mut sorted: Vec<&CountrySummary> = countries.iter().collect();
    sorted.sort_by_key(|c| std::cmp::Reverse(c.total_cases));
    sorted.truncate(n);
    sorted
}

/// The last `days` points of a series.
pub fn recent_series(series: &[DailyPoint], days: usize) -> &[DailyPoint] {
    &series[series.len().saturating_sub(days)..]
}

/// Active / recovered / deaths split of the global totals.
pub fn case_distribution(global: &GlobalSummary) -> Vec<DistributionSlice> {
    let parts = [
        ("Active", global.active_cases, "#f59e0b"),
        ("Recovered", global.recovered, "#10b981"),
        ("Deaths", global.deaths, "#ef4444"),
    ];
    let total: u64 = parts.iter().map(|(_, v, _)| v).sum();

    parts
        .into_iter()
        .map(|(name, value, color)| DistributionSlice {
            name,
            value,
            share: if total == 0 {
                0.0
            } else {
                value as f64 / total as f64
            },
            color,
        })
        .collect()
}

/// State rows for a country, limited to the first `n`. Empty without a breakdown.
pub fn state_breakdown(country: &CountrySummary, n: usize) -> Vec<StateRow> {
    country
        .states
        .iter()
        .flatten()
        .take(n)
        .map(StateRow::from)
        .collect()
}

/// Headline figures from a forecast.
pub fn key_predictions(predictions: &[ForecastPoint]) -> KeyPredictions {
    let thirty = predictions.get(THIRTY_DAY_INDEX);
    KeyPredictions {
        thirty_day_cases: thirty.map_or(0, |p| p.predicted_cases),
        thirty_day_lower: thirty.map_or(0, |p| p.lower_bound),
        thirty_day_upper: thirty.map_or(0, |p| p.upper_bound),
        final_vaccinated: predictions.last().map_or(0, |p| p.predicted_vaccinated),
    }
}

/// Exact-name lookup of a country in a snapshot.
pub fn find_country<'a>(data: &'a ProcessedData, name: &str) -> Option<&'a CountrySummary> {
    data.countries.iter().find(|c| c.country == name)
}
