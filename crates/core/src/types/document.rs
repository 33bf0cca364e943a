//! Documents as returned by the store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field map of a document. Values are schema-flexible JSON.
pub type Fields = serde_json::Map<String, Value>;

/// A document read from the store: its id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned document id (last path segment).
    pub id: String,
    /// Document fields.
    pub fields: Fields,
}

impl Document {
    /// Create a document from an id and field map.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Read a string field.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Read a counter field, treating missing or non-numeric values as zero.
    ///
    /// See [`counter_value`] for what counts as numeric.
    #[must_use]
    pub fn counter(&self, name: &str) -> i64 {
        self.fields.get(name).and_then(counter_value).unwrap_or(0)
    }
}

/// Read a JSON value as an integer counter.
///
/// Integers saturate at the `i64` range. Floats without a fractional part
/// (`2.0`, as some client SDKs write whole numbers) are accepted; any other
/// value yields `None`.
#[must_use]
pub fn counter_value(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(n) = value.as_u64() {
        return Some(i64::try_from(n).unwrap_or(i64::MAX));
    }
    let f = value.as_f64()?;
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    // Float-to-int `as` saturates at the bounds.
    #[allow(clippy::cast_possible_truncation)]
    Some(f as i64)
}

/// Format a timestamp the way the store persists server timestamps.
///
/// RFC 3339, millisecond precision, `Z` suffix, e.g. `2026-10-18T09:30:00.000Z`.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => Document::new("d1", fields),
            _ => Document::new("d1", Fields::new()),
        }
    }

    #[test]
    fn test_counter_defaults_to_zero() {
        let d = doc(json!({"likes": 4, "title": "x", "timesUsed": "7"}));
        assert_eq!(d.counter("likes"), 4);
        assert_eq!(d.counter("missing"), 0);
        assert_eq!(d.counter("title"), 0);
        assert_eq!(d.counter("timesUsed"), 0);
    }

    #[test]
    fn test_counter_saturates_huge_values() {
        let d = doc(json!({"likes": u64::MAX}));
        assert_eq!(d.counter("likes"), i64::MAX);
    }

    #[test]
    fn test_counter_accepts_whole_floats() {
        let d = doc(json!({"likes": 2.0, "timesUsed": 1.5, "wornCount": -3.0}));
        assert_eq!(d.counter("likes"), 2);
        assert_eq!(d.counter("timesUsed"), 0);
        assert_eq!(d.counter("wornCount"), -3);
        assert_eq!(counter_value(&json!(1e300)), Some(i64::MAX));
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).single();
        assert_eq!(
            at.map(format_timestamp).as_deref(),
            Some("2026-10-18T09:30:00.000Z")
        );
    }
}
