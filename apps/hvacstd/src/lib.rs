//! # hvacstd
//!
//! Library half of the hvacstd binary: configuration, CLI commands and the
//! HTTP API, exposed so integration tests can drive them directly.

pub mod api;
pub mod cli;
pub mod config;
