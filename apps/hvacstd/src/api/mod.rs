//! # hvacstd HTTP API Module
//!
//! This module implements the read-only HTTP lookup API using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /tables` - Table names and row counts
//! - `POST /find` - Look up records by predicates, capacity and date
//! - `GET /validate` - Integrity check report
//! - `GET /hash` - Corpus checksum and BLAKE3 hash
//!
//! ## Configuration (Environment Variables)
//!
//! - `HVACSTD_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all
//!   (default: localhost on the serving port and the :3000 dev frontend)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `hvacstd::api::*`)
pub use handlers::{
    find_handler, hash_handler, health_handler, tables_handler, validate_handler,
};
pub use types::{FindRequest, FindResponse, HashResponse, HealthResponse, ValidateResponse};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use hvacstd_core::{IndexedCorpus, StandardsError, Validator};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Port used by `serve` when none is given.
pub const DEFAULT_PORT: u16 = 8080;

/// Port of a locally running frontend dev server.
const DEV_FRONTEND_PORT: u16 = 3000;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
///
/// The corpus is immutable once loaded, so handlers share it through `Arc`
/// without any lock.
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<IndexedCorpus>,
    pub validator: Arc<Validator>,
    /// Port the server listens on; the localhost CORS default follows it.
    pub port: u16,
}

impl AppState {
    /// Create new app state for the default port.
    #[must_use]
    pub fn new(lookup: IndexedCorpus, validator: Validator) -> Self {
        Self {
            lookup: Arc::new(lookup),
            validator: Arc::new(validator),
            port: DEFAULT_PORT,
        }
    }

    /// Set the serving port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `HVACSTD_CORS_ORIGINS`:
/// - If "*": allows all origins
/// - If not set: localhost only, see [`localhost_origins`]
/// - Otherwise: comma-separated list of allowed origins
fn build_cors_layer(port: u16) -> CorsLayer {
    let origins_env = std::env::var("HVACSTD_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (HVACSTD_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in HVACSTD_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors(port)
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No HVACSTD_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors(port)
        }
    }
}

/// Localhost origins allowed when no origin list is configured: the API's own
/// port and the dev frontend port, on both `localhost` and `127.0.0.1`.
#[must_use]
pub fn localhost_origins(port: u16) -> Vec<String> {
    let mut ports = vec![port];
    if port != DEV_FRONTEND_PORT {
        ports.push(DEV_FRONTEND_PORT);
    }
    ["localhost", "127.0.0.1"]
        .iter()
        .flat_map(|host| ports.iter().map(move |p| format!("http://{}:{}", host, p)))
        .collect()
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors(port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = localhost_origins(port)
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(state.port);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/tables", get(handlers::tables_handler))
        .route("/find", post(handlers::find_handler))
        .route("/validate", get(handlers::validate_handler))
        .route("/hash", get(handlers::hash_handler))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), StandardsError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StandardsError::Io {
            path: addr.to_string(),
            reason: format!("bind failed: {}", e),
        })?;

    tracing::info!("hvacstd HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| StandardsError::Io {
            path: addr.to_string(),
            reason: format!("server error: {}", e),
        })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_origins_follow_serving_port() {
        assert_eq!(
            localhost_origins(9090),
            vec![
                "http://localhost:9090",
                "http://localhost:3000",
                "http://127.0.0.1:9090",
                "http://127.0.0.1:3000",
            ]
        );
    }

    #[test]
    fn dev_frontend_port_listed_once() {
        let origins = localhost_origins(DEV_FRONTEND_PORT);
        assert_eq!(origins, vec!["http://localhost:3000", "http://127.0.0.1:3000"]);
    }

    #[test]
    fn every_default_origin_is_a_header_value() {
        for origin in localhost_origins(DEFAULT_PORT) {
            assert!(origin.parse::<HeaderValue>().is_ok(), "{origin}");
        }
    }
}
