use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::schema::error::CoercionFailure;

/// Epoch values above this magnitude are taken as milliseconds
const MS_THRESHOLD: f64 = 2e10;

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub(crate) fn to_text(value: &Value) -> Result<String, CoercionFailure> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(CoercionFailure::Null),
        _ => Err(CoercionFailure::NotAString),
    }
}

/// Text that still has content once surrounding whitespace is trimmed.
/// A blank identifier such as `"   "` is rejected as empty; the text itself
/// is kept as given.
pub(crate) fn to_identifier(value: &Value) -> Result<String, CoercionFailure> {
    let text = to_text(value)?;
    if text.trim().is_empty() {
        return Err(CoercionFailure::Empty);
    }
    Ok(text)
}

pub(crate) fn to_number(value: &Value) -> Result<f64, CoercionFailure> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null => return Err(CoercionFailure::Null),
        _ => None,
    };

    number
        .filter(|n| n.is_finite())
        .ok_or(CoercionFailure::NotANumber)
}

pub(crate) fn to_timestamp(value: &Value) -> Result<DateTime<Utc>, CoercionFailure> {
    match value {
        Value::String(s) => parse_datetime(s.trim()),
        Value::Number(n) => n
            .as_f64()
            .and_then(from_epoch)
            .ok_or(CoercionFailure::NotADateTime),
        Value::Null => Err(CoercionFailure::Null),
        _ => Err(CoercionFailure::NotADateTime),
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, CoercionFailure> {
    if s.is_empty() {
        return Err(CoercionFailure::NotADateTime);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    // No offset (or a bare `Z`) means the value is already UTC
    let naive = s.strip_suffix(['Z', 'z']).unwrap_or(s);
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    s.parse::<f64>()
        .ok()
        .and_then(from_epoch)
        .ok_or(CoercionFailure::NotADateTime)
}

fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }

    let seconds = if value.abs() > MS_THRESHOLD {
        value / 1000.0
    } else {
        value
    };

    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}
