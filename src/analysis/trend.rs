//! Week-over-week trend heuristic.

use crate::models::{RawRecord, Trend, TrendDirection};

/// Number of records in each comparison window.
pub const WINDOW: usize = 7;

/// Percent change beyond which a trend counts as up or down.
pub const THRESHOLD_PERCENT: f64 = 2.0;

/// Classifies a country's recent case trajectory.
///
/// Records are ordered by date (stable for equal dates), the last
/// [`WINDOW`] form the recent window and up to [`WINDOW`] before those the
/// previous one. An empty window averages to 0 and a zero previous average
/// yields no change.
pub fn calculate_trend(records: &[&RawRecord]) -> Trend {
    if records.len() < 2 {
        return Trend::STABLE;
    }

    let mut sorted: Vec<&RawRecord> = records.to_vec();
    sorted.sort_by_key(|r| r.date);

    let recent_start = sorted.len().saturating_sub(WINDOW);
    let previous_start = recent_start.saturating_sub(WINDOW);

    let recent_avg = average_cases(&sorted[recent_start..]);
    let previous_avg = average_cases(&sorted[previous_start..recent_start]);

    let change = percent_change(previous_avg, recent_avg);

    Trend {
        direction: classify(change),
        magnitude: change.abs(),
    }
}

/// Mean of `total_cases`, 0 for an empty slice.
pub fn average_cases(records: &[&RawRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: f64 = records.iter().map(|r| r.total_cases as f64).sum();
    sum / records.len() as f64
}

/// Percent change from `previous` to `recent`, 0 when `previous` is not positive.
pub fn percent_change(previous: f64, recent: f64) -> f64 {
    if previous > 0.0 {
        ((recent - previous) / previous) * 100.0
    } else {
        0.0
    }
}

fn classify(change: f64) -> TrendDirection {
    if change > THRESHOLD_PERCENT {
        TrendDirection::Up
    } else if change < -THRESHOLD_PERCENT {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn series(cases: &[u64]) -> Vec<RawRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        cases
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let mut r = RawRecord::new("A", start + Days::new(i as u64));
                r.total_cases = c;
                r
            })
            .collect()
    }

    fn trend_of(records: &[RawRecord]) -> Trend {
        let refs: Vec<&RawRecord> = records.iter().collect();
        calculate_trend(&refs)
    }

    #[test]
    fn test_single_record_is_stable() {
        assert_eq!(trend_of(&series(&[100])), Trend::STABLE);
        assert_eq!(trend_of(&[]), Trend::STABLE);
    }

    #[test]
    fn test_empty_previous_window_is_stable() {
        // Two records both land in the recent window.
        let trend = trend_of(&series(&[100, 120]));
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.magnitude, 0.0);
    }

    #[test]
    fn test_rising_cases() {
        let cases: Vec<u64> = [100; 7].iter().chain(&[200; 7]).copied().collect();
        let trend = trend_of(&series(&cases));
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!((trend.magnitude - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_falling_cases() {
        let cases: Vec<u64> = [200; 7].iter().chain(&[150; 7]).copied().collect();
        let trend = trend_of(&series(&cases));
        assert_eq!(trend.direction, TrendDirection::Down);
        assert!((trend.magnitude - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_within_threshold_is_stable() {
        let cases: Vec<u64> = [100; 7].iter().chain(&[102; 7]).copied().collect();
        let trend = trend_of(&series(&cases));
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert!((trend.magnitude - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_previous_window() {
        // 8 records: previous window is just the first one.
        let trend = trend_of(&series(&[50, 100, 100, 100, 100, 100, 100, 100]));
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!((trend.magnitude - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_only_last_fourteen_count() {
        let mut cases = vec![1_000_000; 5];
        cases.extend([100; 7]);
        cases.extend([100; 7]);
        let trend = trend_of(&series(&cases));
        assert_eq!(trend, Trend::STABLE);
    }

    #[test]
    fn test_records_are_ordered_by_date() {
        let mut records = series(&[100, 100, 100, 100, 100, 100, 100, 300]);
        records.reverse();
        // Reversed input: after sorting the 300 is still the newest record.
        let trend = trend_of(&records);
        assert_eq!(trend.direction, TrendDirection::Up);
    }

    #[test]
    fn test_zero_previous_average() {
        let trend = trend_of(&series(&[0, 500]));
        assert_eq!(trend, Trend::STABLE);
        assert_eq!(percent_change(0.0, 500.0), 0.0);
    }
}
