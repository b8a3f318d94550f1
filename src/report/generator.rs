//! Markdown and JSON report generation.
//!
//! The Markdown report mirrors the dashboard views: global panel, case
//! distribution, top countries, an optional country drill-down, globe
//! markers, recent history and the forecast.

use crate::analysis::views::{
    case_distribution, find_country, format_compact, key_predictions, recent_series,
    state_breakdown, top_countries,
};
use crate::models::{DailyPoint, ForecastPoint, GlobalSummary, Report, ReportMetadata};
use crate::geo::GlobeMarker;
use anyhow::Result;
use std::path::Path;

/// Forecast table rows are sampled every this many days.
const FORECAST_STRIDE: usize = 7;

/// What to include in a Markdown report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_countries: usize,
    pub recent_days: usize,
    pub top_states: usize,
    pub include_markers: bool,
    /// Country to drill into.
    pub country: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_countries: crate::analysis::views::DEFAULT_TOP_COUNTRIES,
            recent_days: crate::analysis::views::DEFAULT_RECENT_DAYS,
            top_states: crate::analysis::views::DEFAULT_TOP_STATES,
            include_markers: true,
            country: None,
        }
    }
}

impl From<&crate::config::ReportConfig> for ReportOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            top_countries: config.top_countries,
            recent_days: config.recent_days,
            top_states: config.top_states,
            include_markers: config.include_markers,
            country: None,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str("# Epidemic Dashboard Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_global_section(&report.data.global));
    output.push_str(&generate_top_countries_section(report, options.top_countries));

    if let Some(ref country) = options.country {
        output.push_str(&generate_country_section(report, country, options.top_states));
    }

    if options.include_markers {
        output.push_str(&generate_markers_section(&report.markers));
    }

    output.push_str(&generate_history_section(recent_series(
        &report.data.time_series,
        options.recent_days,
    )));
    output.push_str(&generate_forecast_section(&report.data.predictions));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Records Loaded:** {}\n",
        metadata.records_loaded
    ));
    if metadata.records_skipped > 0 {
        section.push_str(&format!(
            "- **Rows Skipped:** {}\n",
            metadata.records_skipped
        ));
    }
    section.push_str(&format!("- **History:** {}\n", metadata.history_source));
    if let Some(seed) = metadata.seed {
        section.push_str(&format!("- **Seed:** {}\n", seed));
    }
    section.push_str(&format!(
        "- **Forecast Horizon:** {} days\n\n",
        metadata.horizon_days
    ));

    section
}

/// Generate the global summary and case distribution.
fn generate_global_section(global: &GlobalSummary) -> String {
    let mut section = String::new();

    section.push_str("## Global Summary\n\n");
    section.push_str("| Metric | Value | Exact |\n");
    section.push_str("|:---|---:|---:|\n");

    let rows = [
        ("Total Cases", global.total_cases),
        ("Active Cases", global.active_cases),
        ("Recovered", global.recovered),
        ("Deaths", global.deaths),
        ("Vaccinated", global.vaccinated),
        ("Population", global.population),
    ];
    for (label, value) in rows {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            label,
            format_compact(value as f64),
            value
        ));
    }
    section.push_str(&format!(
        "| Vaccination Rate | {:.1}% | |\n\n",
        global.vaccination_rate
    ));

    section.push_str("### Case Distribution\n\n");
    section.push_str("| Status | Cases | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for slice in case_distribution(global) {
        section.push_str(&format!(
            "| {} | {} | {:.0}% |\n",
            slice.name,
            format_compact(slice.value as f64),
            slice.share * 100.0
        ));
    }
    section.push('\n');

    section
}

/// Generate the top countries table.
fn generate_top_countries_section(report: &Report, n: usize) -> String {
    let mut section = String::new();

    section.push_str("## Top Countries\n\n");

    let top = top_countries(&report.data.countries, n);
    if top.is_empty() {
        section.push_str("No country data available.\n\n");
        return section;
    }

    section.push_str("| # | Country | Cases | Deaths | Vaccinated | Trend |\n");
    section.push_str("|:---:|:---|---:|---:|---:|:---:|\n");
    for (i, country) in top.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {:.1}% | {} {:.1}% |\n",
            i + 1,
            country.country,
            format_compact(country.total_cases as f64),
            format_compact(country.deaths as f64),
            country.vaccination_rate,
            country.trend.direction.arrow(),
            country.trend.magnitude
        ));
    }
    section.push('\n');

    section
}

/// Generate the drill-down section for one country.
fn generate_country_section(report: &Report, name: &str, top_states: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Country: {}\n\n", name));

    let Some(country) = find_country(&report.data, name) else {
        section.push_str(&format!("No data available for {}.\n\n", name));
        return section;
    };

    section.push_str(&format!(
        "- **Cases:** {} ({} active, {} recovered)\n",
        country.total_cases, country.active_cases, country.recovered
    ));
    section.push_str(&format!("- **Deaths:** {}\n", country.deaths));
    section.push_str(&format!(
        "- **Vaccination Rate:** {:.1}%\n",
        country.vaccination_rate
    ));
    section.push_str(&format!(
        "- **Trend:** {} ({:.1}%)\n",
        country.trend.direction, country.trend.magnitude
    ));
    section.push_str(&format!(
        "- **Coordinates:** {:.4}, {:.4}\n\n",
        country.latitude, country.longitude
    ));

    let states = state_breakdown(country, top_states);
    if states.is_empty() {
        section.push_str(&format!("No state-level data available for {}.\n\n", name));
        return section;
    }

    section.push_str("| State | Cases | Deaths | Recovered | Vaccinated |\n");
    section.push_str("|:---|---:|---:|---:|---:|\n");
    for state in states {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {:.1}% |\n",
            state.name,
            format_compact(state.cases as f64),
            format_compact(state.deaths as f64),
            format_compact(state.recovered as f64),
            state.vaccination_rate
        ));
    }
    section.push('\n');

    section
}

/// Generate the globe marker table.
fn generate_markers_section(markers: &[GlobeMarker]) -> String {
    if markers.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Globe Markers\n\n");
    section.push_str("| Country | Position (x, y, z) | Size | Color |\n");
    section.push_str("|:---|:---|---:|:---:|\n");
    for marker in markers {
        section.push_str(&format!(
            "| {} | ({:.3}, {:.3}, {:.3}) | {:.3} | `{}` |\n",
            marker.country,
            marker.position.x,
            marker.position.y,
            marker.position.z,
            marker.size,
            marker.color
        ));
    }
    section.push('\n');

    section
}

/// Generate the recent history table.
fn generate_history_section(points: &[DailyPoint]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Recent History (Last {} Days)\n\n", points.len()));

    if points.is_empty() {
        section.push_str("No history available.\n\n");
        return section;
    }

    section.push_str("| Date | Cases | Deaths | Recovered | Vaccinated |\n");
    section.push_str("|:---|---:|---:|---:|---:|\n");
    for point in points {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            point.date,
            format_compact(point.cases as f64),
            format_compact(point.deaths as f64),
            format_compact(point.recovered as f64),
            format_compact(point.vaccinated as f64)
        ));
    }
    section.push('\n');

    section
}

/// Generate the forecast section.
fn generate_forecast_section(predictions: &[ForecastPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Forecast\n\n");

    if predictions.is_empty() {
        section.push_str("No forecast available.\n\n");
        return section;
    }

    let key = key_predictions(predictions);
    section.push_str("### Key Predictions\n\n");
    if predictions.len() > 29 {
        section.push_str(&format!(
            "- **30-Day Case Projection:** {} ({} - {})\n",
            format_compact(key.thirty_day_cases as f64),
            format_compact(key.thirty_day_lower as f64),
            format_compact(key.thirty_day_upper as f64)
        ));
    }
    section.push_str(&format!(
        "- **Vaccinated by {}:** {}\n\n",
        predictions[predictions.len() - 1].date,
        format_compact(key.final_vaccinated as f64)
    ));

    section.push_str("### Projection\n\n");
    section.push_str("| Date | Cases | Lower | Upper | Deaths | Vaccinated |\n");
    section.push_str("|:---|---:|---:|---:|---:|---:|\n");

    let last = predictions.len() - 1;
    let sampled = predictions
        .iter()
        .enumerate()
        .filter(|(i, _)| (i + 1) % FORECAST_STRIDE == 0 || *i == last);

    for (_, point) in sampled {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            point.date,
            point.predicted_cases,
            point.lower_bound,
            point.upper_bound,
            point.predicted_deaths,
            point.predicted_vaccinated
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(
        "*Forecasts use fixed growth rates with a ±10% band; they are not a statistical model.*\n",
    );

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::process;
    use crate::geo::{globe_markers, GlobeConfig};
    use crate::models::{DailyPoint, RawRecord};
    use chrono::{NaiveDate, Utc};

    fn create_test_report() -> Report {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let mut us = RawRecord::new("United States", date);
        us.total_cases = 1_500_000;
        us.active_cases = 100_000;
        us.recovered = 1_350_000;
        us.deaths = 50_000;
        us.vaccinated = 200_000_000;
        us.population = 331_000_000;

        let mut texas = RawRecord::new("United States", date);
        texas.state = Some("Texas".to_string());
        texas.total_cases = 40_000;

        let mut india = RawRecord::new("India", date);
        india.total_cases = 2_000;

        let history = vec![DailyPoint {
            date,
            cases: 1000,
            deaths: 10,
            recovered: 900,
            vaccinated: 500,
        }];

        let data = process(&[us, texas, india], history, 35);
        let markers = globe_markers(&data.countries, &GlobeConfig::default());

        Report {
            metadata: ReportMetadata {
                source: "records.csv".to_string(),
                generated_at: Utc::now(),
                records_loaded: 3,
                records_skipped: 1,
                history_source: "history.csv".to_string(),
                seed: None,
                horizon_days: 35,
            },
            data,
            markers,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let options = ReportOptions {
            country: Some("United States".to_string()),
            ..ReportOptions::default()
        };
        let markdown = generate_markdown_report(&report, &options);

        assert!(markdown.contains("# Epidemic Dashboard Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("Rows Skipped:** 1"));
        assert!(markdown.contains("## Global Summary"));
        assert!(markdown.contains("| Total Cases | 1.5M | 1542000 |"));
        assert!(markdown.contains("## Top Countries"));
        assert!(markdown.contains("## Country: United States"));
        assert!(markdown.contains("| Texas | 40K |"));
        assert!(markdown.contains("## Globe Markers"));
        assert!(markdown.contains("30-Day Case Projection"));
    }

    #[test]
    fn test_top_countries_order() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &ReportOptions::default());

        let us = markdown.find("| 1 | United States |").unwrap();
        let india = markdown.find("| 2 | India |").unwrap();
        assert!(us < india);
    }

    #[test]
    fn test_country_without_states() {
        let report = create_test_report();
        let section = generate_country_section(&report, "India", 5);
        assert!(section.contains("No state-level data available for India"));

        let section = generate_country_section(&report, "Atlantis", 5);
        assert!(section.contains("No data available for Atlantis"));
    }

    #[test]
    fn test_markers_can_be_omitted() {
        let report = create_test_report();
        let options = ReportOptions {
            include_markers: false,
            ..ReportOptions::default()
        };
        let markdown = generate_markdown_report(&report, &options);
        assert!(!markdown.contains("## Globe Markers"));
    }

    #[test]
    fn test_forecast_section_samples_weekly() {
        let report = create_test_report();
        let section = generate_forecast_section(&report.data.predictions);

        // Days 7, 14, 21, 28, 35 of a 35-day horizon.
        assert_eq!(section.matches("| 2024-").count(), 5);
        assert!(section.contains("| 2024-03-08 | 1035 |"));
    }

    #[test]
    fn test_empty_forecast() {
        let section = generate_forecast_section(&[]);
        assert!(section.contains("No forecast available."));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"totalCases\""));
        assert!(json.contains("\"predictions\""));
        assert!(json.contains("\"markers\""));
    }
}
