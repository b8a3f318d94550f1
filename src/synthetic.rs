//! Synthetic fixtures for demos and tests.
//!
//! There is no real time-series feed, so the dashboard runs on a generated
//! history and, before any upload, on a generated country dataset. Both
//! take the random source as a parameter so a fixed seed reproduces the
//! same output.

use crate::analysis::{forecast, Aggregation};
use crate::geo::coordinates;
use crate::models::{
    vaccination_rate, CountrySummary, DailyPoint, GlobalSummary, ProcessedData, StateSummary,
    Totals, Trend, TrendDirection,
};
use chrono::{Days, NaiveDate};
use rand::Rng;

/// Length of the generated history.
pub const SYNTHETIC_DAYS: usize = 365;

/// First day of the generated history.
pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Countries in the demo dataset with their reference populations.
pub const DEMO_COUNTRIES: &[(&str, u64)] = &[
    ("United States", 331_000_000),
    ("India", 1_380_000_000),
    ("Brazil", 212_000_000),
    ("United Kingdom", 67_000_000),
    ("Russia", 145_000_000),
    ("France", 65_000_000),
    ("Germany", 83_000_000),
    ("Italy", 60_000_000),
    ("Spain", 47_000_000),
    ("Canada", 38_000_000),
];

const US_STATES: &[&str] = &[
    "California",
    "Texas",
    "Florida",
    "New York",
    "Pennsylvania",
    "Illinois",
    "Ohio",
    "Georgia",
];

const INDIA_STATES: &[&str] = &[
    "Maharashtra",
    "Kerala",
    "Karnataka",
    "Tamil Nadu",
    "Uttar Pradesh",
    "Delhi",
    "West Bengal",
];

/// Generate `days` daily points starting at `start`.
///
/// Each field is a base value plus random noise plus a linear drift;
/// vaccinations grow linearly without noise.
pub fn synthetic_history<R: Rng + ?Sized>(
    rng: &mut R,
    start: NaiveDate,
    days: usize,
) -> Vec<DailyPoint> {
    (0..days)
        .map_while(|i| {
            let date = start.checked_add_days(Days::new(i as u64))?;
            let day = i as f64;
            Some(DailyPoint {
                date,
                cases: noisy(rng, 500_000.0, 200_000.0, 1_000.0 * day),
                deaths: noisy(rng, 10_000.0, 5_000.0, 50.0 * day),
                recovered: noisy(rng, 400_000.0, 150_000.0, 800.0 * day),
                vaccinated: (1_000_000.0 + 50_000.0 * day) as u64,
            })
        })
        .collect()
}

fn noisy<R: Rng + ?Sized>(rng: &mut R, base: f64, spread: f64, drift: f64) -> u64 {
    (base + rng.gen::<f64>() * spread + drift).floor() as u64
}

/// `floor(r * range) + min`, the shape used by every demo counter.
fn uniform<R: Rng + ?Sized>(rng: &mut R, min: u64, range: u64) -> u64 {
    (rng.gen::<f64>() * range as f64).floor() as u64 + min
}

/// Generate the demo country summaries and their global rollup.
///
/// The global vaccination rate is computed against the summed reference
/// populations.
pub fn mock_summaries<R: Rng + ?Sized>(rng: &mut R) -> Aggregation {
    let countries: Vec<CountrySummary> = DEMO_COUNTRIES
        .iter()
        .map(|&(name, population)| mock_country(rng, name, population))
        .collect();

    let totals = countries
        .iter()
        .map(CountrySummary::totals)
        .fold(Totals::default(), Totals::merge);

    Aggregation {
        global: GlobalSummary::from(totals),
        countries,
    }
}

/// Generate the demo snapshot shown before any upload.
///
/// The country figures are random; `time_series` is kept as given and
/// forecast `horizon_days` ahead.
pub fn mock_processed_data<R: Rng + ?Sized>(
    rng: &mut R,
    time_series: Vec<DailyPoint>,
    horizon_days: u32,
) -> ProcessedData {
    let Aggregation { global, countries } = mock_summaries(rng);
    let predictions = forecast(&time_series, horizon_days);

    ProcessedData {
        global,
        countries,
        time_series,
        predictions,
    }
}

fn mock_country<R: Rng + ?Sized>(rng: &mut R, name: &str, population: u64) -> CountrySummary {
    let total_cases = uniform(rng, 1_000_000, 10_000_000);
    let deaths = (total_cases as f64 * 0.02).floor() as u64;
    let recovered = (total_cases as f64 * 0.85).floor() as u64;
    let active_cases = total_cases - deaths - recovered;
    let vaccinated = (population as f64 * (0.6 + rng.gen::<f64>() * 0.3)).floor() as u64;

    let direction = if rng.gen::<f64>() > 0.5 {
        TrendDirection::Down
    } else if rng.gen::<f64>() > 0.5 {
        TrendDirection::Up
    } else {
        TrendDirection::Stable
    };
    let magnitude = rng.gen::<f64>() * 10.0;

    let states = match name {
        "United States" => Some(mock_states(rng, US_STATES, &US_STATE_RANGES)),
        "India" => Some(mock_states(rng, INDIA_STATES, &INDIA_STATE_RANGES)),
        _ => None,
    };

    let coords = coordinates(name);

    CountrySummary {
        country: name.to_string(),
        total_cases,
        active_cases,
        recovered,
        deaths,
        vaccinated,
        population,
        vaccination_rate: vaccination_rate(vaccinated, population),
        trend: Trend {
            direction,
            magnitude,
        },
        latitude: coords.latitude,
        longitude: coords.longitude,
        states,
    }
}

/// `(min, range)` per state counter.
struct StateRanges {
    total_cases: (u64, u64),
    active_cases: (u64, u64),
    recovered: (u64, u64),
    deaths: (u64, u64),
    vaccinated: (u64, u64),
    population: (u64, u64),
}

const US_STATE_RANGES: StateRanges = StateRanges {
    total_cases: (500_000, 2_000_000),
    active_cases: (10_000, 100_000),
    recovered: (400_000, 1_800_000),
    deaths: (5_000, 50_000),
    vaccinated: (5_000_000, 20_000_000),
    population: (5_000_000, 30_000_000),
};

const INDIA_STATE_RANGES: StateRanges = StateRanges {
    total_cases: (1_000_000, 5_000_000),
    active_cases: (50_000, 200_000),
    recovered: (900_000, 4_500_000),
    deaths: (10_000, 100_000),
    vaccinated: (10_000_000, 50_000_000),
    population: (20_000_000, 100_000_000),
};

fn mock_states<R: Rng + ?Sized>(
    rng: &mut R,
    names: &[&str],
    ranges: &StateRanges,
) -> Vec<StateSummary> {
    names
        .iter()
        .map(|name| StateSummary {
            state: (*name).to_string(),
            total_cases: uniform(rng, ranges.total_cases.0, ranges.total_cases.1),
            active_cases: uniform(rng, ranges.active_cases.0, ranges.active_cases.1),
            recovered: uniform(rng, ranges.recovered.0, ranges.recovered.1),
            deaths: uniform(rng, ranges.deaths.0, ranges.deaths.1),
            vaccinated: uniform(rng, ranges.vaccinated.0, ranges.vaccinated.1),
            population: uniform(rng, ranges.population.0, ranges.population.1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DEFAULT_HORIZON_DAYS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn demo(seed: u64) -> ProcessedData {
        let mut rng = StdRng::seed_from_u64(seed);
        let history = synthetic_history(&mut rng, default_start(), SYNTHETIC_DAYS);
        mock_processed_data(&mut rng, history, DEFAULT_HORIZON_DAYS)
    }

    #[test]
    fn test_history_is_reproducible() {
        let a = synthetic_history(&mut StdRng::seed_from_u64(7), default_start(), 30);
        let b = synthetic_history(&mut StdRng::seed_from_u64(7), default_start(), 30);
        let c = synthetic_history(&mut StdRng::seed_from_u64(8), default_start(), 30);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_history_shape() {
        let series = synthetic_history(&mut StdRng::seed_from_u64(1), default_start(), SYNTHETIC_DAYS);

        assert_eq!(series.len(), 365);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(series[364].date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));

        for (i, p) in series.iter().enumerate() {
            let i = i as u64;
            assert!(p.cases >= 500_000 + 1_000 * i && p.cases < 700_000 + 1_000 * i);
            assert!(p.deaths >= 10_000 + 50 * i && p.deaths < 15_000 + 50 * i);
            assert!(p.recovered >= 400_000 + 800 * i && p.recovered < 550_000 + 800 * i);
            assert_eq!(p.vaccinated, 1_000_000 + 50_000 * i);
        }
    }

    #[test]
    fn test_mock_data_shape() {
        let data = demo(42);

        assert_eq!(data.countries.len(), DEMO_COUNTRIES.len());
        assert_eq!(data.time_series.len(), SYNTHETIC_DAYS);
        assert_eq!(data.predictions.len(), 90);

        let us = &data.countries[0];
        assert_eq!(us.country, "United States");
        assert_eq!(us.state_count(), 8);
        assert_eq!(data.countries[1].state_count(), 7);
        assert!(data.countries[2].states.is_none());

        for c in &data.countries {
            assert_eq!(c.active_cases + c.deaths + c.recovered, c.total_cases);
            assert!(c.vaccination_rate >= 60.0 && c.vaccination_rate < 90.0);
            assert!(c.trend.magnitude < 10.0);
        }

        let sum: u64 = data.countries.iter().map(|c| c.total_cases).sum();
        assert_eq!(data.global.total_cases, sum);
        let population: u64 = DEMO_COUNTRIES.iter().map(|(_, p)| p).sum();
        assert_eq!(data.global.population, population);
    }

    #[test]
    fn test_mock_data_is_reproducible() {
        assert_eq!(demo(3), demo(3));
    }

    #[test]
    fn test_mock_data_keeps_given_history() {
        let history = synthetic_history(&mut StdRng::seed_from_u64(5), default_start(), 10);
        let data = mock_processed_data(&mut StdRng::seed_from_u64(5), history.clone(), 14);

        assert_eq!(data.time_series, history);
        assert_eq!(data.predictions.len(), 14);
        assert_eq!(data.countries.len(), DEMO_COUNTRIES.len());

        let empty = mock_processed_data(&mut StdRng::seed_from_u64(5), Vec::new(), 14);
        assert!(empty.predictions.is_empty());
    }
}
