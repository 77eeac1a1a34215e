//! # Search Engine
//!
//! Finds the record(s) of a table matching a [`Query`].
//!
//! Pipeline:
//! 1. Predicate filter (missing field = skip, `"Any"` = wildcard).
//! 2. Capacity band, when a capacity is given: whole numbers are raised by
//!    1%, a record qualifies iff `minimum_capacity < capacity <= maximum_capacity`,
//!    and if nothing qualifies the capacity is lowered by 1% and tried once more.
//! 3. Date window, when a date is given: `start_date < date <= end_date`.
//! 4. Result: none, the single match, or the first match in source order
//!    (with a warning listing every match).
//!
//! The same pipeline runs over a full table scan or over index candidates;
//! candidates always arrive in ascending row order.

use crate::primitives::{
    CAPACITY_ROUND_DOWN, CAPACITY_ROUND_UP, END_DATE_FIELD, MAX_CAPACITY_FIELD,
    MIN_CAPACITY_FIELD, START_DATE_FIELD,
};
use crate::query::date_field;
use crate::{Corpus, Query, Record, StandardsError};
use chrono::NaiveDate;
use serde_json::{Map, Value};

// =============================================================================
// LOOKUP TRAIT
// =============================================================================

/// Read-only lookup over a corpus.
///
/// Implemented by [`Corpus`] (linear scan) and by
/// [`IndexedCorpus`](crate::IndexedCorpus) (field indexes). Both return
/// identical results for identical queries.
pub trait Lookup {
    /// Run a query and return every match with its row index.
    fn search(&self, query: &Query) -> Result<SearchOutcome<'_>, StandardsError>;

    /// The best match: the only one, or the first in source order.
    ///
    /// Ambiguity is logged as a warning, never an error. A miss is `Ok(None)`.
    fn find(&self, query: &Query) -> Result<Option<&Record>, StandardsError> {
        Ok(self.search(query)?.resolve(query))
    }

    /// Every match, in source order.
    fn find_all(&self, query: &Query) -> Result<Vec<&Record>, StandardsError> {
        Ok(self.search(query)?.records())
    }
}

impl Lookup for Corpus {
    fn search(&self, query: &Query) -> Result<SearchOutcome<'_>, StandardsError> {
        let store = self.records(&query.table)?;
        Ok(filter_candidates(store.iter(), query))
    }
}

/// Find one record: `find(corpus, table, predicates, capacity, date)`.
pub fn find_object<'c>(
    corpus: &'c Corpus,
    table: &str,
    predicates: &Map<String, Value>,
    capacity: Option<f64>,
    date: Option<NaiveDate>,
) -> Result<Option<&'c Record>, StandardsError> {
    let query = Query {
        table: table.to_string(),
        predicates: predicates.clone(),
        capacity,
        date,
    };
    corpus.find(&query)
}

// =============================================================================
// OUTCOME
// =============================================================================

/// One matching record and its row index in the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'c> {
    pub row: usize,
    pub record: &'c Record,
}

impl Match<'_> {
    /// Name of the record, or its row index.
    #[must_use]
    pub fn label(&self) -> String {
        self.record
            .name()
            .map_or_else(|| format!("row {}", self.row), str::to_string)
    }
}

/// Result of a search before the tie-break.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<'c> {
    /// Matches in ascending row order.
    pub matches: Vec<Match<'c>>,
    /// True when the matches only appeared after lowering the capacity.
    pub capacity_retried: bool,
}

impl<'c> SearchOutcome<'c> {
    /// Number of matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Check if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// More than one record matched.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.matches.len() > 1
    }

    /// The first match in source order, without logging.
    #[must_use]
    pub fn first(&self) -> Option<&'c Record> {
        self.matches.first().map(|m| m.record)
    }

    /// All matched records in source order.
    #[must_use]
    pub fn records(&self) -> Vec<&'c Record> {
        self.matches.iter().map(|m| m.record).collect()
    }

    /// Apply the tie-break and log anything the caller should know about.
    #[must_use]
    pub fn resolve(&self, query: &Query) -> Option<&'c Record> {
        if self.capacity_retried {
            tracing::warn!(
                table = %query.table,
                predicates = %query.describe(),
                capacity = ?query.capacity,
                "no capacity band matched; matched after lowering capacity by 1%"
            );
        }

        if self.is_ambiguous() {
            let labels: Vec<String> = self.matches.iter().map(Match::label).collect();
            tracing::warn!(
                table = %query.table,
                predicates = %query.describe(),
                matches = ?labels,
                "found {} matching objects; returning the first",
                self.matches.len()
            );
        }

        self.first()
    }
}

// =============================================================================
// FILTER PIPELINE
// =============================================================================

/// Run predicate, capacity and date filters over candidates in row order.
pub(crate) fn filter_candidates<'c, I>(candidates: I, query: &Query) -> SearchOutcome<'c>
where
    I: IntoIterator<Item = (usize, &'c Record)>,
{
    let matching: Vec<Match<'c>> = candidates
        .into_iter()
        .filter(|(_, record)| query.matches(record))
        .map(|(row, record)| Match { row, record })
        .collect();

    let (mut matches, capacity_retried) = match query.capacity {
        Some(capacity) => filter_capacity(matching, capacity),
        None => (matching, false),
    };

    if let Some(date) = query.date {
        matches.retain(|m| within_dates(m.record, date));
    }

    SearchOutcome {
        matches,
        capacity_retried,
    }
}

fn filter_capacity(candidates: Vec<Match<'_>>, capacity: f64) -> (Vec<Match<'_>>, bool) {
    let capacity = adjusted_capacity(capacity);

    let banded: Vec<Match<'_>> = candidates
        .iter()
        .filter(|m| within_capacity(m.record, capacity))
        .copied()
        .collect();
    if !banded.is_empty() {
        return (banded, false);
    }

    let lowered = capacity * CAPACITY_ROUND_DOWN;
    let retried: Vec<Match<'_>> = candidates
        .into_iter()
        .filter(|m| within_capacity(m.record, lowered))
        .collect();
    let found = !retried.is_empty();
    (retried, found)
}

/// Whole-number capacities are raised by 1% so values sitting exactly on a
/// band boundary fall into the upper band.
#[must_use]
pub fn adjusted_capacity(capacity: f64) -> f64 {
    if capacity.fract() == 0.0 {
        capacity * CAPACITY_ROUND_UP
    } else {
        capacity
    }
}

/// `minimum_capacity < capacity <= maximum_capacity`, both bounds required.
#[must_use]
pub fn within_capacity(record: &Record, capacity: f64) -> bool {
    match (
        record.number_field(MIN_CAPACITY_FIELD),
        record.number_field(MAX_CAPACITY_FIELD),
    ) {
        (Some(min), Some(max)) => min < capacity && capacity <= max,
        _ => false,
    }
}

/// `start_date < date <= end_date`, both bounds required.
#[must_use]
pub fn within_dates(record: &Record, date: NaiveDate) -> bool {
    match (
        date_field(record, START_DATE_FIELD),
        date_field(record, END_DATE_FIELD),
    ) {
        (Some(start), Some(end)) => start < date && date <= end,
        _ => false,
    }
}

// =============================================================================
// TESTS
// =============================================================================
