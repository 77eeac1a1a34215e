//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::Config;
use hvacstd_core::{Corpus, Lookup, Query, StandardsError, Validator, Violation, parse_date};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

// =============================================================================
// HELPERS
// =============================================================================

/// Pretty-print a value as JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<(), StandardsError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| StandardsError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

/// Split `field=value`. The value is read as JSON when it parses, so
/// `poles=4` is a number and `type=Enclosed` a string.
pub fn parse_predicate(text: &str) -> Result<(String, Value), StandardsError> {
    let (field, raw) = text.split_once('=').ok_or_else(|| {
        StandardsError::InvalidQuery(format!("expected FIELD=VALUE, got '{}'", text))
    })?;
    let field = field.trim();
    if field.is_empty() {
        return Err(StandardsError::InvalidQuery(format!(
            "empty field name in '{}'",
            text
        )));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((field.to_string(), value))
}

/// Build a query from command-line pieces.
pub fn build_query(
    table: &str,
    predicates: &[String],
    capacity: Option<f64>,
    date: Option<&str>,
) -> Result<Query, StandardsError> {
    let mut query = Query::new(table);
    for text in predicates {
        let (field, value) = parse_predicate(text)?;
        query = query.with(field, value);
    }
    if let Some(capacity) = capacity {
        if !capacity.is_finite() {
            return Err(StandardsError::InvalidQuery(format!(
                "capacity must be a finite number, got {}",
                capacity
            )));
        }
        query = query.capacity(capacity);
    }
    if let Some(date) = date {
        query = query.on_date(parse_date(date)?);
    }
    Ok(query)
}

fn load(config: &Config) -> Result<Corpus, StandardsError> {
    let corpus = config.load_corpus()?;
    tracing::debug!(
        tables = corpus.len(),
        checksum = corpus.checksum(),
        "corpus ready"
    );
    Ok(corpus)
}

// =============================================================================
// TABLES COMMAND
// =============================================================================

/// List loaded tables.
pub fn cmd_tables(config: &Config, json_mode: bool) -> Result<(), StandardsError> {
    let stats = load(config)?.stats();

    if json_mode {
        return print_json(&stats);
    }

    println!("hvacstd Tables");
    println!("==============");
    for table in &stats.tables {
        let kind = if table.searchable { "records" } else { "opaque" };
        println!("  {:<40} {:>8} rows  ({})", table.name, table.rows, kind);
    }
    println!();
    println!(
        "{} tables, {} records",
        stats.table_count, stats.record_count
    );

    Ok(())
}

// =============================================================================
// FIND COMMAND
// =============================================================================

/// Look up the record(s) matching a query.
pub fn cmd_find(
    config: &Config,
    json_mode: bool,
    verbose: bool,
    query: &Query,
    all: bool,
) -> Result<(), StandardsError> {
    let lookup = config.index_corpus(Arc::new(load(config)?))?;
    let outcome = lookup.search(query)?;

    let records = if all {
        outcome.records()
    } else {
        outcome.resolve(query).into_iter().collect()
    };

    if json_mode {
        let output = serde_json::json!({
            "table": query.table,
            "found": !records.is_empty(),
            "match_count": outcome.len(),
            "capacity_retried": outcome.capacity_retried,
            "records": records,
        });
        return print_json(&output);
    }

    if verbose {
        println!("Query: {} {}", query.table, query.describe());
        let rows: Vec<usize> = outcome.matches.iter().map(|m| m.row).collect();
        println!("Matching rows: {:?}", rows);
    }

    if records.is_empty() {
        println!("No matching record in '{}'", query.table);
        return Ok(());
    }
    if outcome.capacity_retried {
        println!("(matched after lowering the capacity by 1%)");
    }
    for record in records {
        print_json(record)?;
    }

    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// One line of the plain-text validation report.
pub fn violation_line(violation: &Violation) -> String {
    format!("ERROR - {}", violation)
}

/// Run the integrity checks.
///
/// Violations are reported, not fatal, unless `strict` is set.
pub fn cmd_validate(config: &Config, json_mode: bool, strict: bool) -> Result<(), StandardsError> {
    let corpus = load(config)?;
    let violations = Validator::new(config.validator_config()).validate(&corpus);

    if json_mode {
        let output = serde_json::json!({
            "valid": violations.is_empty(),
            "count": violations.len(),
            "violations": violations,
        });
        print_json(&output)?;
    } else {
        for violation in &violations {
            println!("{}", violation_line(violation));
        }
        if violations.is_empty() {
            println!("No integrity problems found");
        } else {
            println!("{} violation(s) found", violations.len());
        }
    }

    if strict && !violations.is_empty() {
        return Err(StandardsError::ValidationFailed(violations.len()));
    }
    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Print the corpus fingerprints.
pub fn cmd_hash(config: &Config, json_mode: bool) -> Result<(), StandardsError> {
    let corpus = load(config)?;
    let checksum = format!("{:016x}", corpus.checksum());
    let blake3 = corpus.crypto_hash();

    if json_mode {
        let output = serde_json::json!({
            "checksum": checksum,
            "blake3": blake3,
            "tables": corpus.len(),
        });
        return print_json(&output);
    }

    println!("Checksum (FNV-1a): {}", checksum);
    println!("BLAKE3:            {}", blake3);

    Ok(())
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(config: &Config, host: &str, port: u16) -> Result<(), StandardsError> {
    let corpus = Arc::new(load(config)?);
    let lookup = config.index_corpus(corpus)?;
    let state =
        api::AppState::new(lookup, Validator::new(config.validator_config())).with_port(port);

    println!("hvacstd Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Tables:   {}", state.lookup.corpus().len());
    println!();
    println!("Endpoints:");
    println!("  GET  /health   - Health check");
    println!("  GET  /tables   - List tables");
    println!("  POST /find     - Look up records");
    println!("  GET  /validate - Integrity check report");
    println!("  GET  /hash     - Corpus fingerprint");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// TESTS
// =============================================================================
