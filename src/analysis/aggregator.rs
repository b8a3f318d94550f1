//! Record aggregation.
//!
//! Turns a flat batch of raw records into the global rollup and the
//! per-country summaries. Grouping keeps the order in which countries are
//! first seen, and every division is guarded so degenerate input yields 0.

use super::trend::calculate_trend;
use crate::geo::coordinates;
use crate::models::{CountrySummary, GlobalSummary, RawRecord, StateSummary, Totals};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Output of [`aggregate`]: the rollups without the time series fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub global: GlobalSummary,
    pub countries: Vec<CountrySummary>,
}

/// Records grouped by country name, in first-seen order.
///
/// Lookups go through a name -> slot index so grouping stays linear while
/// iteration order is the insertion order rather than hash order.
#[derive(Debug, Default)]
pub struct CountryGroups<'a> {
    index: HashMap<&'a str, usize>,
    groups: Vec<(&'a str, Vec<&'a RawRecord>)>,
}

impl<'a> CountryGroups<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to its country's group, creating the group if needed.
    pub fn insert(&mut self, record: &'a RawRecord) {
        let name = record.country.as_str();
        match self.index.get(name) {
            Some(&slot) => self.groups[slot].1.push(record),
            None => {
                self.index.insert(name, self.groups.len());
                self.groups.push((name, vec![record]));
            }
        }
    }

    /// Records for one country, in input order.
    pub fn get(&self, country: &str) -> Option<&[&'a RawRecord]> {
        self.index
            .get(country)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a RawRecord])> + '_ {
        self.groups
            .iter()
            .map(|(name, records)| (*name, records.as_slice()))
    }
}

impl<'a> FromIterator<&'a RawRecord> for CountryGroups<'a> {
    fn from_iter<I: IntoIterator<Item = &'a RawRecord>>(iter: I) -> Self {
        let mut groups = Self::new();
        for record in iter {
            groups.insert(record);
        }
        groups
    }
}

/// Aggregate a batch of records into global and per-country summaries.
pub fn aggregate(records: &[RawRecord]) -> Aggregation {
    let global = GlobalSummary::from(Totals::from_records(records));
    let groups: CountryGroups<'_> = records.iter().collect();

    debug!(
        "Aggregated {} records into {} countries",
        records.len(),
        groups.len()
    );

    let countries = groups
        .iter()
        .map(|(country, entries)| summarize_country(country, entries))
        .collect();

    Aggregation { global, countries }
}

/// Build the summary for one country's records.
pub fn summarize_country(country: &str, entries: &[&RawRecord]) -> CountrySummary {
    let totals = Totals::from_records(entries.iter().copied());

    let states: Vec<StateSummary> = entries
        .iter()
        .filter_map(|e| StateSummary::from_record(e))
        .collect();

    let coords = coordinates(country);

    CountrySummary {
        country: country.to_string(),
        total_cases: totals.total_cases,
        active_cases: totals.active_cases,
        recovered: totals.recovered,
        deaths: totals.deaths,
        vaccinated: totals.vaccinated,
        population: totals.population,
        vaccination_rate: totals.vaccination_rate(),
        trend: calculate_trend(entries),
        latitude: coords.latitude,
        longitude: coords.longitude,
        states: if states.is_empty() { None } else { Some(states) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrendDirection;
    use chrono::NaiveDate;

    fn record(country: &str, date: &str, cases: u64) -> RawRecord {
        let mut r = RawRecord::new(
            country,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        );
        r.total_cases = cases;
        r
    }

    fn state_record(country: &str, state: &str, cases: u64) -> RawRecord {
        let mut r = record(country, "2024-01-01", cases);
        r.state = Some(state.to_string());
        r
    }

    #[test]
    fn test_empty_input() {
        let result = aggregate(&[]);
        assert_eq!(result.global, GlobalSummary::default());
        assert!(result.countries.is_empty());
    }

    #[test]
    fn test_two_records_same_country() {
        let mut a = record("A", "2024-01-01", 100);
        a.deaths = 5;
        let mut b = record("A", "2024-01-02", 120);
        b.deaths = 6;

        let result = aggregate(&[a, b]);

        assert_eq!(result.countries.len(), 1);
        let country = &result.countries[0];
        assert_eq!(country.country, "A");
        assert_eq!(country.total_cases, 220);
        assert_eq!(country.deaths, 11);
        assert_eq!(country.trend.direction, TrendDirection::Stable);
        assert_eq!(country.trend.magnitude, 0.0);
        assert!(country.states.is_none());
    }

    #[test]
    fn test_first_seen_order() {
        let records = vec![
            record("Spain", "2024-01-01", 1),
            record("Brazil", "2024-01-01", 2),
            record("Spain", "2024-01-02", 3),
            record("Canada", "2024-01-01", 4),
        ];

        let names: Vec<_> = aggregate(&records)
            .countries
            .into_iter()
            .map(|c| c.country)
            .collect();
        assert_eq!(names, vec!["Spain", "Brazil", "Canada"]);
    }

    #[test]
    fn test_grouping_is_case_sensitive() {
        let records = vec![record("India", "2024-01-01", 1), record("india", "2024-01-01", 2)];
        let result = aggregate(&records);
        assert_eq!(result.countries.len(), 2);
        assert_eq!(result.countries[1].latitude, 0.0);
    }

    #[test]
    fn test_state_rows_counted_and_not_merged() {
        let records = vec![
            record("United States", "2024-01-01", 1000),
            state_record("United States", "Texas", 10),
            state_record("United States", "Ohio", 20),
            state_record("United States", "Texas", 30),
        ];

        let result = aggregate(&records);
        let us = &result.countries[0];

        assert_eq!(us.total_cases, 1060);
        let states = us.states.as_ref().unwrap();
        let names: Vec<_> = states.iter().map(|s| s.state.as_str()).collect();
        assert_eq!(names, vec!["Texas", "Ohio", "Texas"]);
        assert_eq!(states[2].total_cases, 30);
        assert_eq!(us.latitude, 37.0902);
        assert_eq!(us.longitude, -95.7129);
    }

    #[test]
    fn test_empty_state_tag_counts_as_none() {
        let result = aggregate(&[state_record("A", "", 5)]);

        let country = &result.countries[0];
        assert_eq!(country.total_cases, 5);
        assert_eq!(country.states, None);
        assert_eq!(country.state_count(), 0);
    }

    #[test]
    fn test_vaccination_rates() {
        let mut a = record("A", "2024-01-01", 0);
        a.vaccinated = 25;
        a.population = 100;
        let mut b = record("B", "2024-01-01", 0);
        b.vaccinated = 10;

        let result = aggregate(&[a, b]);

        assert_eq!(result.countries[0].vaccination_rate, 25.0);
        assert_eq!(result.countries[1].vaccination_rate, 0.0);
        assert_eq!(result.global.vaccination_rate, 35.0);
    }

    #[test]
    fn test_global_equals_sum_of_countries() {
        let records = vec![
            record("A", "2024-01-01", 5),
            record("B", "2024-01-01", 7),
            record("A", "2024-01-02", 11),
        ];
        let result = aggregate(&records);
        let sum: u64 = result.countries.iter().map(|c| c.total_cases).sum();
        assert_eq!(sum, result.global.total_cases);
        assert_eq!(sum, 23);
    }

    #[test]
    fn test_country_groups_lookup() {
        let records = vec![record("A", "2024-01-01", 1), record("A", "2024-01-02", 2)];
        let groups: CountryGroups<'_> = records.iter().collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.get("A").map(<[_]>::len), Some(2));
        assert!(groups.get("B").is_none());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let records = vec![
            record("B", "2024-01-03", 9),
            record("A", "2024-01-01", 5),
            record("B", "2024-01-01", 3),
        ];
        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
