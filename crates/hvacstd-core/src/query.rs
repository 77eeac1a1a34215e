//! # Query Module
//!
//! Structured lookup queries and the predicate matching rules.
//!
//! - A predicate is an equality constraint on one field.
//! - A record lacking the field does not fail the predicate.
//! - A record holding `"Any"` in the field matches every query value.
//! - Numbers compare by value, so `4` and `4.0` are equal.

use crate::primitives::WILDCARD;
use crate::{Record, StandardsError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// QUERY
// =============================================================================

/// A lookup against one table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    /// Table to search.
    pub table: String,
    /// Field equality constraints, in the order given.
    #[serde(default)]
    pub predicates: Map<String, Value>,
    /// Capacity that must fall inside the record's capacity band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    /// Date that must fall inside the record's date window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Query {
    /// Create a query with no constraints.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Add an equality predicate.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.insert(field.into(), value.into());
        self
    }

    /// Constrain by capacity band.
    #[must_use]
    pub fn capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Constrain by date window.
    #[must_use]
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Check a record against every predicate.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        record_matches(record, &self.predicates)
    }

    /// Compact rendering of the predicates for log output.
    #[must_use]
    pub fn describe(&self) -> String {
        Value::Object(self.predicates.clone()).to_string()
    }
}

// =============================================================================
// MATCHING
// =============================================================================

/// Whether a record satisfies all predicates.
///
/// A record carrying none of the predicate fields matches vacuously.
#[must_use]
pub fn record_matches(record: &Record, predicates: &Map<String, Value>) -> bool {
    predicates.iter().all(|(field, wanted)| {
        record
            .get(field)
            .is_none_or(|actual| field_matches(actual, wanted))
    })
}

/// Whether one record value satisfies one predicate value.
#[must_use]
pub fn field_matches(actual: &Value, wanted: &Value) -> bool {
    is_wildcard(actual) || values_equal(actual, wanted)
}

/// Whether a record value is the `"Any"` wildcard.
#[must_use]
pub fn is_wildcard(value: &Value) -> bool {
    value.as_str() == Some(WILDCARD)
}

/// JSON equality with numbers compared by value.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

// =============================================================================
// DATES
// =============================================================================

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339 timestamps
/// (the time part is dropped).
pub fn parse_date(text: &str) -> Result<NaiveDate, StandardsError> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(stamp.date_naive());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Ok(stamp.date());
    }
    Err(StandardsError::InvalidDate(text.to_string()))
}

/// A record's date field, if present and parseable.
#[must_use]
pub fn date_field(record: &Record, field: &str) -> Option<NaiveDate> {
    record.str_field(field).and_then(|s| parse_date(s).ok())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_field_is_not_a_mismatch() {
        let r = record(json!({"type": "Enclosed"}));
        let q = Query::new("motors").with("type", "Enclosed").with("synchronous_speed", 1800);
        assert!(q.matches(&r));
    }

    #[test]
    fn present_field_must_be_equal() {
        let r = record(json!({"type": "Open"}));
        assert!(!Query::new("motors").with("type", "Enclosed").matches(&r));
    }

    #[test]
    fn wildcard_matches_anything() {
        let r = record(json!({"template": "Any"}));
        assert!(Query::new("t").with("template", "90.1-2019").matches(&r));
        assert!(Query::new("t").with("template", 12).matches(&r));
        assert!(Query::new("t").with("template", Value::Null).matches(&r));
    }

    #[test]
    fn wildcard_is_record_side_only() {
        let r = record(json!({"template": "90.1-2019"}));
        assert!(!Query::new("t").with("template", "Any").matches(&r));
    }

    #[test]
    fn numbers_compare_by_value() {
        let r = record(json!({"number_of_poles": 4}));
        assert!(Query::new("motors").with("number_of_poles", 4.0).matches(&r));
        assert!(!Query::new("motors").with("number_of_poles", "4").matches(&r));
    }

    #[test]
    fn null_field_only_matches_null() {
        let r = record(json!({"fuel": null}));
        assert!(!Query::new("t").with("fuel", "Gas").matches(&r));
        assert!(Query::new("t").with("fuel", Value::Null).matches(&r));
    }

    #[test]
    fn no_predicates_match_everything() {
        assert!(Query::new("t").matches(&record(json!({"a": 1}))));
    }

    #[test]
    fn parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2014, 11, 10).unwrap();
        assert_eq!(parse_date("2014-11-10").unwrap(), expected);
        assert_eq!(parse_date("2014-11-10T00:00:00+00:00").unwrap(), expected);
        assert_eq!(parse_date("2014-11-10T08:30:00").unwrap(), expected);
        assert!(matches!(
            parse_date("tomorrow"),
            Err(StandardsError::InvalidDate(_))
        ));
    }

    #[test]
    fn query_deserializes_from_json() {
        let q: Query = serde_json::from_value(json!({
            "table": "motors",
            "predicates": {"type": "Enclosed"},
            "capacity": 2.5,
            "date": "2020-01-01"
        }))
        .unwrap();
        assert_eq!(q.table, "motors");
        assert_eq!(q.capacity, Some(2.5));
        assert_eq!(q.date, NaiveDate::from_ymd_opt(2020, 1, 1));
    }
}
