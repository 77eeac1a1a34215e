//! # Formats Module
//!
//! Canonical serialization of records and corpora.
//!
//! The canonical form is what equality-of-content means across the crate:
//! the duplicate-content check compares canonical record keys, and the
//! corpus fingerprint hashes the canonical corpus bytes.

mod canonical;

pub use canonical::*;
