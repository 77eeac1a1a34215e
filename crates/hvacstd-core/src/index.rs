//! # Field Indexes
//!
//! Exact-value indexes over one field of one table.
//!
//! A plain lookup scans the whole table. An index narrows the scan to the
//! rows that can possibly satisfy the indexed predicate:
//! - rows whose field equals the query value, plus
//! - the wildcard bucket: rows lacking the field or holding `"Any"`.
//!
//! Both lists are kept in ascending row order and merged, and every other
//! predicate is still checked in full, so an indexed lookup returns exactly
//! what the linear scan returns, in the same order.

use crate::query::is_wildcard;
use crate::search::{Lookup, SearchOutcome, filter_candidates};
use crate::{Corpus, Query, Record, StandardsError};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

// =============================================================================
// INDEX KEY
// =============================================================================

/// Hashable form of a JSON value, consistent with predicate equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Null,
    Bool(bool),
    /// f64 bits; `-0.0` is folded into `0.0`.
    Number(u64),
    Text(String),
    /// Arrays and objects, by canonical rendering.
    Composite(String),
}

impl IndexKey {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => IndexKey::Null,
            Value::Bool(b) => IndexKey::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f == 0.0 => IndexKey::Number(0.0f64.to_bits()),
                Some(f) => IndexKey::Number(f.to_bits()),
                None => IndexKey::Composite(n.to_string()),
            },
            Value::String(s) => IndexKey::Text(s.clone()),
            other => IndexKey::Composite(crate::formats::canonical_string(other)),
        }
    }
}

// =============================================================================
// FIELD INDEX
// =============================================================================

/// Row lists keyed by the value of one field.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    field: String,
    buckets: HashMap<IndexKey, Vec<usize>>,
    wildcard: Vec<usize>,
}

impl FieldIndex {
    /// Index `field` over the given records.
    #[must_use]
    pub fn build(field: &str, records: &[Record]) -> Self {
        let mut buckets: HashMap<IndexKey, Vec<usize>> = HashMap::new();
        let mut wildcard = Vec::new();

        for (row, record) in records.iter().enumerate() {
            match record.get(field) {
                Some(value) if !is_wildcard(value) => {
                    buckets
                        .entry(IndexKey::from_value(value))
                        .or_default()
                        .push(row);
                }
                _ => wildcard.push(row),
            }
        }

        Self {
            field: field.to_string(),
            buckets,
            wildcard,
        }
    }

    /// The indexed field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Number of distinct indexed values.
    #[must_use]
    pub fn distinct_values(&self) -> usize {
        self.buckets.len()
    }

    /// Rows that may match `value`, in ascending order.
    #[must_use]
    pub fn candidates(&self, value: &Value) -> Vec<usize> {
        let exact = self
            .buckets
            .get(&IndexKey::from_value(value))
            .map(Vec::as_slice)
            .unwrap_or_default();
        merge_sorted(exact, &self.wildcard)
    }
}

fn merge_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

// =============================================================================
// INDEXED CORPUS
// =============================================================================

/// A corpus plus field indexes, used wherever lookups are hot.
///
/// Holds the corpus through an `Arc` so a server can share one instance
/// across request handlers without locking.
#[derive(Debug, Clone)]
pub struct IndexedCorpus {
    corpus: Arc<Corpus>,
    /// table -> indexes, in the order they were added
    indexes: BTreeMap<String, Vec<FieldIndex>>,
}

impl IndexedCorpus {
    /// Wrap a corpus with no indexes.
    #[must_use]
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self {
            corpus,
            indexes: BTreeMap::new(),
        }
    }

    /// Add an index on `table.field`.
    ///
    /// Fails if the table is missing or does not hold records.
    pub fn with_index(mut self, table: &str, field: &str) -> Result<Self, StandardsError> {
        let store = self.corpus.records(table)?;
        let index = FieldIndex::build(field, store.records());
        tracing::debug!(
            table,
            field,
            distinct = index.distinct_values(),
            "built field index"
        );
        self.indexes.entry(table.to_string()).or_default().push(index);
        Ok(self)
    }

    /// The underlying corpus.
    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Shared handle to the underlying corpus.
    #[must_use]
    pub fn shared(&self) -> Arc<Corpus> {
        Arc::clone(&self.corpus)
    }

    /// Indexed fields of a table.
    pub fn indexed_fields(&self, table: &str) -> impl Iterator<Item = &str> {
        self.indexes
            .get(table)
            .into_iter()
            .flatten()
            .map(FieldIndex::field)
    }

    /// First index of the table whose field appears in the query.
    fn pick_index<'s, 'q>(&'s self, query: &'q Query) -> Option<(&'s FieldIndex, &'q Value)> {
        self.indexes.get(&query.table)?.iter().find_map(|index| {
            query
                .predicates
                .get(index.field())
                .map(|value| (index, value))
        })
    }
}

impl Lookup for IndexedCorpus {
    fn search(&self, query: &Query) -> Result<SearchOutcome<'_>, StandardsError> {
        let store = self.corpus.records(&query.table)?;

        let Some((index, value)) = self.pick_index(query) else {
            return Ok(filter_candidates(store.iter(), query));
        };

        let candidates = index
            .candidates(value)
            .into_iter()
            .filter_map(|row| store.get(row).map(|record| (row, record)));
        Ok(filter_candidates(candidates, query))
    }
}

// =============================================================================
// TESTS
// =============================================================================
