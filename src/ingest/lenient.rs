//! Forgiving field parsers for uploads.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Any value that may appear in a numeric column.
///
/// Variants are tried in order, so negative integers land in `Float`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientCount {
    Unsigned(u64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LenientCount {
    fn into_count(self) -> u64 {
        match self {
            LenientCount::Unsigned(n) => n,
            LenientCount::Other(_) => 0,
            LenientCount::Float(f) => float_to_count(f),
            LenientCount::Text(s) => parse_count(&s),
        }
    }
}

/// Deserialize a count, mapping anything unusable to 0.
pub(super) fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LenientCount>::deserialize(deserializer)?.map_or(0, LenientCount::into_count))
}

/// Parse a count from text, accepting thousands separators and decimals.
pub(super) fn parse_count(text: &str) -> u64 {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    if let Ok(n) = cleaned.parse::<u64>() {
        return n;
    }
    cleaned.parse::<f64>().map_or(0, float_to_count)
}

fn float_to_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

/// Parse a calendar date from the formats uploads commonly use.
pub(super) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(text, "%m/%d/%Y").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1,234,567"), 1_234_567);
        assert_eq!(parse_count(" 42 "), 42);
        assert_eq!(parse_count("12.9"), 12);
        assert_eq!(parse_count("-5"), 0);
        assert_eq!(parse_count("n/a"), 0);
        assert_eq!(parse_count(""), 0);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_date("2024-03-01"), expected);
        assert_eq!(parse_date("2024-03-01T23:30:00Z"), expected);
        assert_eq!(parse_date("2024-03-01T08:00:00"), expected);
        assert_eq!(parse_date("03/01/2024"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_count")]
        n: u64,
    }

    #[test]
    fn test_lenient_count_json() {
        let parse = |s: &str| serde_json::from_str::<Row>(s).unwrap().n;
        assert_eq!(parse(r#"{"n": 7}"#), 7);
        assert_eq!(parse(r#"{"n": "8"}"#), 8);
        assert_eq!(parse(r#"{"n": 9.99}"#), 9);
        assert_eq!(parse(r#"{"n": -1}"#), 0);
        assert_eq!(parse(r#"{"n": null}"#), 0);
        assert_eq!(parse(r#"{"n": true}"#), 0);
        assert_eq!(parse(r#"{"n": [1]}"#), 0);
        assert_eq!(parse(r#"{}"#), 0);
    }

    #[test]
    fn test_lenient_count_negative_values() {
        let json = |s: &str| serde_json::from_str::<Row>(s).unwrap().n;
        assert_eq!(json(r#"{"n": -12}"#), 0);
        assert_eq!(json(r#"{"n": -0.5}"#), 0);

        let mut reader = csv::Reader::from_reader("n\n-4\n7\n".as_bytes());
        let rows: Vec<u64> = reader
            .deserialize::<Row>()
            .map(|row| row.unwrap().n)
            .collect();
        assert_eq!(rows, vec![0, 7]);
    }
}
