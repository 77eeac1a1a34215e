//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use hvacstd_core::{Query, Record, SearchOutcome, StandardsError, Violation, parse_date};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// FIND REQUEST/RESPONSE
// =============================================================================

/// Lookup request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindRequest {
    pub table: String,
    #[serde(default)]
    pub predicates: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Return every match instead of the first.
    #[serde(default)]
    pub all: bool,
}

impl FindRequest {
    /// Convert to a core query, validating fields.
    pub fn to_query(&self) -> Result<Query, StandardsError> {
        if self.table.trim().is_empty() {
            return Err(StandardsError::InvalidQuery("table must not be empty".to_string()));
        }
        let date = self.date.as_deref().map(parse_date).transpose()?;
        Ok(Query {
            table: self.table.clone(),
            predicates: self.predicates.clone(),
            capacity: self.capacity,
            date,
        })
    }
}

/// Lookup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindResponse {
    pub success: bool,
    pub found: bool,
    /// Returned records: the first match, or all of them.
    pub records: Vec<Record>,
    /// Row indexes of every match, in source order.
    pub rows: Vec<usize>,
    pub capacity_retried: bool,
    pub error: Option<String>,
}

impl FindResponse {
    /// Build from a search outcome, returning the first match or all matches.
    pub fn from_outcome(outcome: &SearchOutcome<'_>, query: &Query, all: bool) -> Self {
        let records: Vec<Record> = if all {
            outcome.records().into_iter().cloned().collect()
        } else {
            outcome.resolve(query).into_iter().cloned().collect()
        };
        Self {
            success: true,
            found: !records.is_empty(),
            records,
            rows: outcome.matches.iter().map(|m| m.row).collect(),
            capacity_retried: outcome.capacity_retried,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            found: false,
            records: vec![],
            rows: vec![],
            capacity_retried: false,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// VALIDATE RESPONSE
// =============================================================================

/// Integrity check report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub count: usize,
    pub violations: Vec<Violation>,
    /// Human-readable rendering of `violations`, same order.
    pub messages: Vec<String>,
}

impl From<Vec<Violation>> for ValidateResponse {
    fn from(violations: Vec<Violation>) -> Self {
        let messages = violations.iter().map(ToString::to_string).collect();
        Self {
            valid: violations.is_empty(),
            count: violations.len(),
            violations,
            messages,
        }
    }
}

// =============================================================================
// HASH RESPONSE
// =============================================================================

/// Corpus fingerprint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    /// FNV-1a checksum as 16 hex digits.
    pub checksum: String,
    pub blake3: String,
    pub tables: usize,
}
