//! Analysis pipeline.
//!
//! Aggregation and forecasting are independent: records feed the
//! aggregator, a daily history feeds the forecaster, and [`process`]
//! bundles both into one snapshot.

pub mod aggregator;
pub mod forecast;
pub mod trend;
pub mod views;

pub use aggregator::{aggregate, Aggregation, CountryGroups};
pub use forecast::{forecast, ForecastModel, DEFAULT_HORIZON_DAYS};
pub use trend::calculate_trend;

use crate::models::{DailyPoint, ProcessedData, RawRecord};
use tracing::info;

/// Build a full snapshot from a record batch and a daily history.
///
/// The history is expected in chronological order; it is stored as given
/// and the forecast starts the day after its last point.
pub fn process(records: &[RawRecord], history: Vec<DailyPoint>, horizon_days: u32) -> ProcessedData {
    let Aggregation { global, countries } = aggregate(records);
    let predictions = forecast(&history, horizon_days);

    info!(
        "Processed {} records: {} countries, {} history days, {} forecast days",
        records.len(),
        countries.len(),
        history.len(),
        predictions.len()
    );

    ProcessedData {
        global,
        countries,
        time_series: history,
        predictions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_process_bundles_both_pipelines() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut record = RawRecord::new("France", date);
        record.total_cases = 42;

        let history = vec![DailyPoint {
            date,
            cases: 1000,
            deaths: 10,
            recovered: 0,
            vaccinated: 500,
        }];

        let data = process(&[record], history, 3);

        assert_eq!(data.global.total_cases, 42);
        assert_eq!(data.countries[0].country, "France");
        assert_eq!(data.countries[0].latitude, 46.2276);
        assert_eq!(data.time_series.len(), 1);
        assert_eq!(data.predictions.len(), 3);
        assert_eq!(
            data.predictions[0].date,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_process_empty_inputs() {
        let data = process(&[], Vec::new(), DEFAULT_HORIZON_DAYS);
        assert_eq!(data, ProcessedData::default());
    }
}
