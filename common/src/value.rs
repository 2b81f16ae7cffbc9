//! Scalar coercion and date parsing
//!
//! Spreadsheet cells arrive as loosely typed strings or numbers. This module
//! turns them into the canonical primitives the rest of the core works with:
//! numbers, JSON literals, and `YYYY-MM-DDT00:00:00.000Z` date strings.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;

/// Days between the spreadsheet serial epoch (1899-12-30) and 1970-01-01
pub const SPREADSHEET_EPOCH_OFFSET_DAYS: f64 = 25569.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Human date formats, tried in order; first match wins.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y/%m/%d",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

lazy_static::lazy_static! {
    static ref NUMBER_RE: Regex =
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap();
}

/// Coerce a raw cell value to its best-guess native type.
///
/// Only strings are rewritten; every other value passes through.
pub fn coerce(value: &Value) -> Value {
    match value {
        Value::String(s) => coerce_str(s),
        other => other.clone(),
    }
}

/// Coerce a string cell.
///
/// Numeric strings become numbers, JSON arrays/objects/booleans are parsed,
/// anything else (including the empty string) is kept as-is.
pub fn coerce_str(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(raw.to_string());
    }

    if NUMBER_RE.is_match(trimmed) {
        if let Some(number) = trimmed.parse::<f64>().ok().and_then(number_value) {
            return number;
        }
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(v @ (Value::Array(_) | Value::Object(_) | Value::Bool(_))) => v,
        _ => Value::String(raw.to_string()),
    }
}

/// Build a JSON number, preferring an integer representation for whole values.
pub fn number_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Some(Value::from(n as i64));
    }
    serde_json::Number::from_f64(n).map(Value::Number)
}

/// Parse a date cell into the canonical midnight timestamp.
///
/// Numbers are spreadsheet serial dates; strings go through ISO/RFC parsing
/// and then the fixed list of human formats.
pub fn parse_date(value: &Value) -> Result<String> {
    match value {
        Value::Number(n) => {
            let serial = n.as_f64().ok_or_else(|| Error::DateParse { value: n.to_string() })?;
            from_serial(serial).ok_or_else(|| Error::DateParse { value: n.to_string() })
        }
        Value::String(s) => parse_date_str(s),
        other => Err(Error::DateParse { value: other.to_string() }),
    }
}

/// Parse a date string into the canonical midnight timestamp.
pub fn parse_date_str(raw: &str) -> Result<String> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(canonical(dt.date_naive()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(canonical(dt.date_naive()));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(canonical(dt.date()));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(canonical(date));
        }
    }

    Err(Error::DateParse { value: raw.to_string() })
}

fn from_serial(serial: f64) -> Option<String> {
    let ms = (serial - SPREADSHEET_EPOCH_OFFSET_DAYS) * MS_PER_DAY;
    if !ms.is_finite() {
        return None;
    }
    let dt = Utc.timestamp_millis_opt(ms.round() as i64).single()?;
    Some(canonical(dt.date_naive()))
}

fn canonical(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

/// True for null, a missing value, or a whitespace-only string.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Read a value as trimmed text; numbers are rendered without a trailing `.0`.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a value as a number, accepting numeric strings.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let t = s.trim();
            if NUMBER_RE.is_match(t) {
                t.parse::<f64>().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}
