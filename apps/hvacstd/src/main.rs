//! # hvacstd - Standards Table Lookup
//!
//! The main binary for the hvacstd standards lookup engine.
//!
//! This application provides:
//! - CLI interface for lookups and integrity checks
//! - HTTP REST API server (axum-based, read-only)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │              apps/hvacstd (THE BINARY)           │
//! │                                                  │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────┐  │
//! │  │    CLI      │  │  HTTP API   │  │  Config  │  │
//! │  │   (clap)    │  │   (axum)    │  │  (toml)  │  │
//! │  └──────┬──────┘  └──────┬──────┘  └────┬─────┘  │
//! │         └────────────────┼──────────────┘        │
//! │                          ▼                       │
//! │                 ┌────────────────┐               │
//! │                 │  hvacstd-core  │               │
//! │                 │  (THE LOGIC)   │               │
//! │                 └────────────────┘               │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! hvacstd tables
//! hvacstd find -t motors -w number_of_poles=4.0 -w type=Enclosed --capacity 2.5
//! hvacstd validate --strict
//! hvacstd serve --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use hvacstd::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing; HVACSTD_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("HVACSTD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "hvacstd=debug,hvacstd_core=debug,tower_http=debug"
    } else {
        "hvacstd=info,hvacstd_core=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so `--json-mode` output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the hvacstd startup banner.
fn print_banner() {
    println!(
        r#"
  hvacstd v{}
  Standards tables for building energy models
"#,
        env!("CARGO_PKG_VERSION")
    );
}
