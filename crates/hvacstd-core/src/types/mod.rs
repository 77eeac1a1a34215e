//! # Core Type Definitions
//!
//! This module contains the core types shared by every hvacstd component:
//! - `Record`: one schema-less row of a standards table
//! - `StandardsError`: the error taxonomy for load and lookup failures
//!
//! ## Representation
//!
//! Records keep the JSON object they were parsed from. Field names are
//! `String` keys everywhere (records, predicates, indexes), so a predicate
//! key and a record key always compare type-for-type. Field order is the
//! order of the source file (`serde_json` is built with `preserve_order`).

use crate::primitives::NAME_FIELD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// =============================================================================
// RECORD
// =============================================================================

/// A single row of a standards table.
///
/// Records are heterogeneous: any field may be present or absent, and
/// values are plain JSON values (strings, numbers, booleans, null, and the
/// occasional array such as a construction's `materials` layers).
/// A record is never mutated after the loader creates it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create a record from a JSON object.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Get the raw value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Check whether the record carries a field (even if its value is null).
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The record's `name` field, if it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.str_field(NAME_FIELD)
    }

    /// A non-null string field.
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// A numeric field.
    ///
    /// Numeric strings (`"7.5"`) are accepted because several tables store
    /// bounds as text. Null, missing and non-numeric values yield `None`.
    #[must_use]
    pub fn number_field(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Iterate over the fields in source order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// A short human-readable label: the name when present, otherwise the
    /// given context fields joined with `/`.
    #[must_use]
    pub fn label(&self, context_fields: &[&str]) -> String {
        if let Some(name) = self.name() {
            return name.to_string();
        }
        let parts: Vec<String> = context_fields
            .iter()
            .map(|field| match self.get(field) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => "-".to_string(),
                Some(other) => other.to_string(),
            })
            .collect();
        parts.join("/")
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while loading or querying a corpus.
///
/// Lookup misses are not errors: `find` returns `Ok(None)`.
/// Integrity violations are not errors either; the validator reports them
/// as data.
#[derive(Debug, Error)]
pub enum StandardsError {
    /// A table file could not be read.
    #[error("I/O error on '{path}': {reason}")]
    Io { path: String, reason: String },

    /// A table file is not valid JSON. Aborts the whole load.
    #[error("Malformed JSON in '{origin}': {reason}")]
    Parse { origin: String, reason: String },

    /// A table file parsed, but its top level is not an object of tables.
    #[error("Invalid table document '{origin}': {reason}")]
    InvalidDocument { origin: String, reason: String },

    /// A table file exceeds the configured size limit.
    #[error("File '{path}' is {size} bytes, exceeding the maximum of {max} bytes")]
    FileTooLarge { path: String, size: u64, max: u64 },

    /// The requested table is not part of the corpus.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The requested table exists but does not hold records.
    #[error("Table '{0}' does not hold records")]
    NotARecordTable(String),

    /// A date string could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A query or command argument is malformed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration could not be read or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialization error occurred while producing output.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Strict validation found violations.
    #[error("Integrity check failed with {0} violation(s)")]
    ValidationFailed(usize),
}

// =============================================================================
// TESTS
// =============================================================================
