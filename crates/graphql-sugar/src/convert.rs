//! Built-in argument converters.
//!
//! Each function turns one raw argument value into a Rust value. The presets
//! of [`ArgLoader`](crate::ArgLoader) register most of them; the optional
//! variants are exported for callers that want them.

use serde_json::Value;

use crate::shape::{Describe, Shape};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{value} is not {expected}")]
pub struct ConvertError {
    pub value: String,
    pub expected: &'static str,
}

impl ConvertError {
    fn new(value: &Value, expected: &'static str) -> Self {
        Self {
            value: value.to_string(),
            expected,
        }
    }
}

/// A JSON value kept as its compact text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RawJson(pub String);

impl RawJson {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the text back into a value.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.0)
    }
}

impl Describe for RawJson {
    fn shape() -> Shape {
        Shape::opaque::<Self>("json")
    }
}

pub fn load_bool(value: &Value) -> Result<bool, ConvertError> {
    value
        .as_bool()
        .ok_or_else(|| ConvertError::new(value, "a boolean"))
}

/// `null` loads as `None`.
pub fn load_optional_bool(value: &Value) -> Result<Option<bool>, ConvertError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        _ => Err(ConvertError::new(value, "a boolean")),
    }
}

pub fn load_string(value: &Value) -> Result<String, ConvertError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConvertError::new(value, "a string"))
}

/// Accepts integral numbers only; `1.5` and `"1"` are rejected.
pub fn load_int(value: &Value) -> Result<i64, ConvertError> {
    value
        .as_i64()
        .ok_or_else(|| ConvertError::new(value, "an integer"))
}

pub fn load_int32(value: &Value) -> Result<i32, ConvertError> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| ConvertError::new(value, "a 32-bit integer"))
}

pub fn load_float(value: &Value) -> Result<f64, ConvertError> {
    value
        .as_f64()
        .ok_or_else(|| ConvertError::new(value, "a number"))
}

/// Accepts a number or a base 10 string in the `u32` range.
pub fn load_uint(value: &Value) -> Result<u32, ConvertError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(ConvertError::new(value, "an unsigned integer")),
    };
    text.parse::<u32>()
        .map_err(|_| ConvertError::new(value, "an unsigned integer"))
}

pub fn load_raw_json(value: &Value) -> Result<RawJson, ConvertError> {
    Ok(RawJson(value.to_string()))
}

pub fn load_optional_int(value: &Value) -> Result<Option<i64>, ConvertError> {
    match value {
        Value::Null => Ok(None),
        _ => load_int(value).map(Some),
    }
}

pub fn load_optional_string(value: &Value) -> Result<Option<String>, ConvertError> {
    match value {
        Value::Null => Ok(None),
        _ => load_string(value).map(Some),
    }
}

#[cfg(feature = "chrono")]
mod time {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use serde_json::Value;

    use super::ConvertError;
    use crate::shape::{Describe, Shape};

    const NAIVE_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";
    const NAIVE_DATE: &str = "%Y-%m-%d";

    /// Loads an ISO 8601 timestamp. Values without an offset are taken as UTC.
    pub fn load_time(value: &Value) -> Result<DateTime<Utc>, ConvertError> {
        let text = value
            .as_str()
            .ok_or_else(|| ConvertError::new(value, "a timestamp"))?;
        if let Ok(time) = DateTime::parse_from_rfc3339(text) {
            return Ok(time.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, NAIVE_DATE_TIME) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
        NaiveDate::parse_from_str(text, NAIVE_DATE)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| ConvertError::new(value, "a timestamp"))
    }

    impl Describe for DateTime<Utc> {
        fn shape() -> Shape {
            Shape::opaque::<Self>("timestamp")
        }
    }
}

#[cfg(feature = "chrono")]
pub use time::load_time;
