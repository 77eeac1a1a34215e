//! # Canonical Format
//!
//! Deterministic text rendering of JSON values, records and corpora.
//!
//! Rules:
//! - Object keys are emitted in sorted order, so field order is irrelevant.
//! - Integral numbers are emitted without a fraction (`4.0` renders as `4`),
//!   matching the numeric equality used by predicate matching.
//! - Tables are emitted in corpus (sorted) order, records in source order.

use crate::{Corpus, Record, Table};
use serde_json::{Number, Value};
use std::fmt::Write;

/// Largest magnitude rendered as an integer (exactly representable in f64).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

// =============================================================================
// VALUES
// =============================================================================

/// Append the canonical rendering of a JSON value.
pub fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                if let Some(v) = map.get(key.as_str()) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        }
    }
}

/// Canonical rendering of a single value.
#[must_use]
pub fn canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_number(n: &Number, out: &mut String) {
    if let Some(f) = n.as_f64()
        && f.is_finite()
        && f.fract() == 0.0
        && f.abs() < MAX_EXACT_INTEGER
    {
        let _ = write!(out, "{}", f as i64);
        return;
    }
    let _ = write!(out, "{}", n);
}

fn write_string(s: &str, out: &mut String) {
    // serde_json handles escaping; a &str always serializes
    out.push_str(&serde_json::to_string(s).unwrap_or_default());
}

// =============================================================================
// RECORDS
// =============================================================================

/// Canonical content key of a record, optionally ignoring one field.
///
/// Two records with the same key hold the same content.
#[must_use]
pub fn record_key(record: &Record, skip_field: Option<&str>) -> String {
    let mut fields: Vec<(&str, &Value)> = record
        .fields()
        .filter(|(k, _)| Some(*k) != skip_field)
        .collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    out.push('{');
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(key, &mut out);
        out.push(':');
        write_canonical(value, &mut out);
    }
    out.push('}');
    out
}

// =============================================================================
// CORPUS
// =============================================================================

/// Canonical bytes of a whole corpus.
#[must_use]
pub fn corpus_to_bytes(corpus: &Corpus) -> Vec<u8> {
    let mut out = String::new();
    for (name, table) in corpus.tables() {
        write_string(name, &mut out);
        out.push(':');
        match table {
            Table::Records(store) => {
                out.push('[');
                for (i, record) in store.records().iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&record_key(record, None));
                }
                out.push(']');
            }
            Table::Opaque(value) => write_canonical(value, &mut out),
        }
        out.push('\n');
    }
    out.into_bytes()
}

/// 64-bit FNV-1a hash.
#[must_use]
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(PRIME)
    })
}

/// Content checksum of a corpus.
///
/// Equal corpora always produce equal checksums.
#[must_use]
pub fn corpus_checksum(corpus: &Corpus) -> u64 {
    fnv1a64(&corpus_to_bytes(corpus))
}

/// BLAKE3 hash (hex) of the canonical corpus bytes.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn corpus_crypto_hash(corpus: &Corpus) -> String {
    blake3::hash(&corpus_to_bytes(corpus)).to_hex().to_string()
}

// =============================================================================
// TESTS
// =============================================================================
