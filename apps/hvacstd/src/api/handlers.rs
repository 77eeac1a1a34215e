//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{FindRequest, FindResponse, HashResponse, HealthResponse, ValidateResponse},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use hvacstd_core::{Lookup, StandardsError};

/// HTTP status for a failed lookup.
fn status_for(error: &StandardsError) -> StatusCode {
    match error {
        StandardsError::TableNotFound(_) => StatusCode::NOT_FOUND,
        StandardsError::NotARecordTable(_)
        | StandardsError::InvalidDate(_)
        | StandardsError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// TABLES HANDLER
// =============================================================================

/// Table names and row counts.
pub async fn tables_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.lookup.corpus().stats()))
}

// =============================================================================
// FIND HANDLER
// =============================================================================

/// Look up records.
pub async fn find_handler(
    State(state): State<AppState>,
    Json(request): Json<FindRequest>,
) -> impl IntoResponse {
    let query = match request.to_query() {
        Ok(q) => q,
        Err(e) => {
            return (
                status_for(&e),
                Json(FindResponse::error(format!("Invalid request: {}", e))),
            );
        }
    };

    match state.lookup.search(&query) {
        Ok(outcome) => (
            StatusCode::OK,
            Json(FindResponse::from_outcome(&outcome, &query, request.all)),
        ),
        Err(e) => (status_for(&e), Json(FindResponse::error(e.to_string()))),
    }
}

// =============================================================================
// VALIDATE HANDLER
// =============================================================================

/// Run the integrity checks over the loaded corpus.
pub async fn validate_handler(State(state): State<AppState>) -> impl IntoResponse {
    let violations = state.validator.validate(state.lookup.corpus());
    (StatusCode::OK, Json(ValidateResponse::from(violations)))
}

// =============================================================================
// HASH HANDLER
// =============================================================================

/// Corpus checksum and BLAKE3 hash.
pub async fn hash_handler(State(state): State<AppState>) -> impl IntoResponse {
    let corpus = state.lookup.corpus();
    let response = HashResponse {
        checksum: format!("{:016x}", corpus.checksum()),
        blake3: corpus.crypto_hash(),
        tables: corpus.len(),
    };
    (StatusCode::OK, Json(response))
}
