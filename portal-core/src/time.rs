//! Timestamp parsing and formatting shared by the normalizers.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// Parses the timestamp shapes the backend hands out. Values without an
/// offset are taken as UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// `2026-01-27T06:00:00.000Z`
pub fn to_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Non-blank strings pass through untouched; numbers are epoch milliseconds.
pub fn iso_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => {
            let millis = n.as_f64()?.trunc();
            DateTime::from_timestamp_millis(millis as i64).map(to_iso)
        }
        _ => None,
    }
}

/// Rolls `end` forward by one day when it does not come after `start`.
///
/// Shifts stored as separate date and time columns lose the overnight
/// information, so an end at or before the start means the next day. If
/// either side does not parse, `end` is returned as given.
pub fn ensure_shift_end_after_start(start: &str, end: &str) -> String {
    let (Some(start_at), Some(mut end_at)) = (parse_instant(start), parse_instant(end)) else {
        return end.to_string();
    };
    if end_at <= start_at {
        end_at += Duration::days(1);
    }
    to_iso(end_at)
}

#[derive(Debug, Clone)]
pub struct RelativeTimeLabels {
    pub just_now: String,
    pub coming_soon: String,
}

pub fn relative_time_label(iso: &str, labels: &RelativeTimeLabels, now: DateTime<Utc>) -> String {
    let Some(at) = parse_instant(iso) else {
        return labels.just_now.clone();
    };
    let diff = (now - at).num_milliseconds();
    let minute = 60_000_i64;

    if diff.abs() < minute {
        return labels.just_now.clone();
    }
    if diff < 0 {
        return labels.coming_soon.clone();
    }

    let rounded = |unit: i64| (diff as f64 / unit as f64).round() as i64;
    if diff < minute * 60 {
        format!("{}m ago", rounded(minute))
    } else if diff < minute * 60 * 24 {
        format!("{}h ago", rounded(minute * 60))
    } else {
        format!("{}d ago", rounded(minute * 60 * 24))
    }
}
