//! Timestamp normalization to ISO-8601.
//!
//! Never fails: anything that cannot be parsed is passed through as text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};
use serde_json::Value;

use crate::extraction::{value_to_text, Extractor};

/// Formats carrying an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f %z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Epoch values above this are taken to be milliseconds.
const MILLIS_THRESHOLD: f64 = 1e11;

/// Normalize a raw timestamp value.
///
/// Empty or absent input yields an empty string. Parsed values keep their
/// offset when the input had one and omit it otherwise; date-only input stays
/// date-only. Unparseable input is returned as text.
pub fn normalize(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) if s.trim().is_empty() => String::new(),
        Value::String(s) => parse_text(s.trim()).unwrap_or_else(|| s.clone()),
        Value::Number(n) => n
            .as_f64()
            .and_then(from_epoch)
            .unwrap_or_else(|| n.to_string()),
        Value::Object(_) => parse_document_timestamp(raw).unwrap_or_else(|| value_to_text(raw)),
        other => value_to_text(other),
    }
}

fn parse_text(text: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(format_naive(&dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    if (9..=13).contains(&text.len()) && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse::<f64>().ok().and_then(from_epoch);
    }
    None
}

fn format_naive(dt: &NaiveDateTime) -> String {
    let base = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    match dt.nanosecond() {
        0 => base,
        nanos if nanos % 1_000 == 0 => format!("{}.{:06}", base, nanos / 1_000),
        nanos => format!("{}.{:09}", base, nanos),
    }
}

fn from_epoch(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let seconds = if value.abs() > MILLIS_THRESHOLD {
        value / 1000.0
    } else {
        value
    };
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    epoch_to_iso(whole as i64, nanos.min(999_999_999))
}

fn epoch_to_iso(seconds: i64, nanos: u32) -> Option<String> {
    DateTime::<Utc>::from_timestamp(seconds, nanos)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
}

/// Document-store timestamp objects: `{"_seconds", "_nanoseconds"}` or
/// `{"seconds", "nanos"}`.
fn parse_document_timestamp(raw: &Value) -> Option<String> {
    let seconds = raw.resolve(&["_seconds", "seconds"])?.as_i64()?;
    let nanos = raw
        .resolve(&["_nanoseconds", "nanos", "nanoseconds"])
        .and_then(Value::as_u64)
        .unwrap_or(0);
    epoch_to_iso(seconds, u32::try_from(nanos).ok()?)
}
