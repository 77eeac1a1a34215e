//! # hvacstd-core
//!
//! The standards lookup engine for hvacstd - THE LOGIC.
//!
//! Building energy model templates are driven by large JSON tables of
//! equipment and envelope data (boilers, chillers, motors, constructions,
//! schedules, space types, ...). This crate loads those tables once,
//! answers lookups against them, and checks them for integrity problems.
//!
//! ## Components
//!
//! - `store` / `corpus` - Record Store and Corpus Loader
//! - `query` / `search` / `index` - Search Engine (linear or indexed)
//! - `views` / `validate` - Integrity Validator
//! - `formats` - canonical rendering, checksums
//!
//! ## Architectural Constraints
//!
//! - Load once, query many: a `Corpus` is built by one blocking pass and
//!   is never mutated afterwards
//! - No async, no network, no global state: callers own the corpus and pass
//!   it by reference (or `Arc`) to lookups and validation
//! - Deterministic: tables in name order, records in source order, and
//!   "first match wins" on ambiguous lookups

// =============================================================================
// MODULES
// =============================================================================

pub mod corpus;
pub mod formats;
pub mod index;
pub mod primitives;
pub mod query;
pub mod search;
pub mod store;
pub mod types;
pub mod validate;
pub mod views;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{Record, StandardsError};

// =============================================================================
// RE-EXPORTS: Loading
// =============================================================================

pub use corpus::{Corpus, CorpusLoader, CorpusStats, TableStats};
pub use store::{RecordStore, Table};

// =============================================================================
// RE-EXPORTS: Search
// =============================================================================

pub use index::{FieldIndex, IndexedCorpus};
pub use query::{Query, parse_date};
pub use search::{Lookup, Match, SearchOutcome, find_object};

// =============================================================================
// RE-EXPORTS: Validation
// =============================================================================

pub use validate::{Validator, ValidatorConfig, Violation, validate};
