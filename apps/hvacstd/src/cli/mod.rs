//! # hvacstd CLI Module
//!
//! This module implements the CLI interface for hvacstd.
//!
//! ## Available Commands
//!
//! - `tables` - List loaded tables and row counts
//! - `find` - Look up a record by field predicates, capacity and date
//! - `validate` - Run the integrity checks over the loaded tables
//! - `hash` - Print the corpus fingerprint
//! - `serve` - Start the HTTP API

mod commands;

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use clap::{Parser, Subcommand};
use hvacstd_core::StandardsError;
use std::path::{Path, PathBuf};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// hvacstd - standards table lookup
///
/// Loads the JSON standards tables used by building energy model templates,
/// answers lookups against them, and checks them for integrity problems.
#[derive(Parser, Debug)]
#[command(name = "hvacstd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML config file (default: hvacstd.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the table files
    #[arg(short = 'D', long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Table file to load; repeat to load several, later files win
    #[arg(short, long = "file", global = true)]
    pub files: Vec<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List loaded tables
    Tables,

    /// Find the record matching field predicates
    Find {
        /// Table to search
        #[arg(short, long)]
        table: String,

        /// Predicate as field=value; values parse as JSON when possible
        #[arg(short, long = "where", value_name = "FIELD=VALUE")]
        predicates: Vec<String>,

        /// Capacity that must fall in the record's capacity band
        #[arg(long)]
        capacity: Option<f64>,

        /// Date that must fall in the record's date window (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Print every match instead of the first
        #[arg(short, long)]
        all: bool,
    },

    /// Check the loaded tables for integrity problems
    Validate {
        /// Exit with an error when any violation is found
        #[arg(long)]
        strict: bool,
    },

    /// Print the corpus checksum and BLAKE3 hash
    Hash,

    /// Start HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve the effective configuration from the config file and flags.
pub fn resolve_config(cli: &Cli) -> Result<Config, StandardsError> {
    let (path, explicit) = match &cli.config {
        Some(path) => (path.as_path(), true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    Ok(Config::load(path, explicit)?.with_overrides(cli.data_dir.clone(), cli.files.clone()))
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), StandardsError> {
    let config = resolve_config(&cli)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Tables) | None => cmd_tables(&config, json_mode),
        Some(Commands::Find {
            table,
            predicates,
            capacity,
            date,
            all,
        }) => {
            let query = build_query(&table, &predicates, capacity, date.as_deref())?;
            cmd_find(&config, json_mode, cli.verbose, &query, all)
        }
        Some(Commands::Validate { strict }) => cmd_validate(&config, json_mode, strict),
        Some(Commands::Hash) => cmd_hash(&config, json_mode),
        Some(Commands::Serve { host, port }) => cmd_serve(&config, &host, port).await,
    }
}
