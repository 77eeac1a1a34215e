//! # Record Store
//!
//! One table's rows, in the order they appear in the source file.
//!
//! Order never affects whether a record matches a query, but it decides
//! which record wins when several do ("first match wins").

use crate::Record;
use crate::primitives::{NAME_FIELD, TABLE_WRAPPER_KEY};
use serde_json::Value;

// =============================================================================
// RECORD STORE
// =============================================================================

/// An immutable, ordered sequence of records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create a store from records in source order.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// All records in source order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate over `(row index, record)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.records.iter().enumerate()
    }

    /// Get a record by row index.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the first record carries a `name` field.
    ///
    /// The integrity validator uses this to decide if a table is name-keyed.
    #[must_use]
    pub fn has_names(&self) -> bool {
        self.records
            .first()
            .is_some_and(|first| first.contains(NAME_FIELD))
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// A table as found in a source document.
///
/// Arrays of objects become a searchable [`RecordStore`]. Anything else is
/// kept verbatim as `Opaque` so the corpus still reflects the source; it is
/// neither searched nor validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    /// An array of records.
    Records(RecordStore),
    /// A value that is not an array of records.
    Opaque(Value),
}

impl Table {
    /// Build a table from a top-level document value.
    ///
    /// Unwraps `{"table": [...]}` and accepts a bare array directly.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        let inner = match value {
            Value::Object(mut map) if map.contains_key(TABLE_WRAPPER_KEY) => {
                map.remove(TABLE_WRAPPER_KEY).unwrap_or(Value::Null)
            }
            other => other,
        };

        match inner {
            Value::Array(rows) if rows.iter().all(Value::is_object) => {
                let records = rows
                    .into_iter()
                    .filter_map(|row| match row {
                        Value::Object(map) => Some(Record::new(map)),
                        _ => None,
                    })
                    .collect();
                Table::Records(RecordStore::new(records))
            }
            other => Table::Opaque(other),
        }
    }

    /// The record store, if this table holds records.
    #[must_use]
    pub fn records(&self) -> Option<&RecordStore> {
        match self {
            Table::Records(store) => Some(store),
            Table::Opaque(_) => None,
        }
    }

    /// Number of rows (1 for a non-array opaque value).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Table::Records(store) => store.len(),
            Table::Opaque(Value::Array(items)) => items.len(),
            Table::Opaque(_) => 1,
        }
    }

    /// Check if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_becomes_records() {
        let table = Table::from_json(json!([{"name": "A"}, {"name": "B"}]));
        let store = table.records().expect("records");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).and_then(Record::name), Some("B"));
    }

    #[test]
    fn wrapped_array_is_unwrapped() {
        let table = Table::from_json(json!({"table": [{"name": "A"}]}));
        assert_eq!(table.records().map(RecordStore::len), Some(1));
    }

    #[test]
    fn empty_array_is_an_empty_store() {
        let table = Table::from_json(json!([]));
        assert!(table.records().is_some_and(RecordStore::is_empty));
        assert!(table.is_empty());
    }

    #[test]
    fn non_record_rows_stay_opaque() {
        let table = Table::from_json(json!(["a", "b"]));
        assert!(table.records().is_none());
        assert_eq!(table.len(), 2);

        let scalar = Table::from_json(json!({"version": 3}));
        assert!(scalar.records().is_none());
    }

    #[test]
    fn has_names_looks_at_first_record() {
        let named = RecordStore::new(vec![Record::new(
            json!({"name": null}).as_object().cloned().unwrap_or_default(),
        )]);
        assert!(named.has_names());

        let unnamed = RecordStore::new(vec![Record::default()]);
        assert!(!unnamed.has_names());
        assert!(!RecordStore::default().has_names());
    }
}
