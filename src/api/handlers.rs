//! HTTP request handlers for the laytime engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_voyage;
use crate::error::EngineError;
use crate::models::LaytimeOutcome;

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a calculation request and returns the complete replacement
/// outcome (rows, totals, audit trace).
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing laytime calculation request");

    // Handle JSON parsing errors
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    // The body text carries the detailed error from serde
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => ApiError::new(
                    "MISSING_CONTENT_TYPE",
                    "Content-Type must be application/json",
                ),
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    // A snapshot that mixes voyages is a caller bug, not a degradable
    // record; reject it before the engine runs
    if let Err(err) = validate_voyage_consistency(&request) {
        warn!(
            correlation_id = %correlation_id,
            error = %err,
            "Rejected mixed-voyage snapshot"
        );
        let api_error: ApiErrorResponse = err.into();
        return (
            api_error.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(api_error.error),
        )
            .into_response();
    }

    let input = request.into_input();
    let outcome: LaytimeOutcome = calculate_voyage(&input, state.config().profile());

    info!(
        correlation_id = %correlation_id,
        calculation_id = %outcome.calculation_id,
        voyage_id = %outcome.voyage_id,
        method = ?outcome.method,
        rows = outcome.rows.len(),
        warnings = outcome.audit_trace.warnings.len(),
        demurrage_cents = %outcome.totals.demurrage_amount_cents,
        despatch_cents = %outcome.totals.despatch_amount_cents,
        duration_us = outcome.audit_trace.duration_us,
        "Calculation completed successfully"
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(outcome),
    )
        .into_response()
}

/// Rejects snapshots whose records carry an explicit foreign voyage id.
fn validate_voyage_consistency(request: &CalculationRequest) -> Result<(), EngineError> {
    for cargo in &request.cargoes {
        if let Some(voyage_id) = &cargo.voyage_id {
            if voyage_id != &request.voyage_id {
                return Err(EngineError::VoyageMismatch {
                    entity: "cargo".to_string(),
                    id: cargo.id.clone(),
                    voyage_id: request.voyage_id.clone(),
                });
            }
        }
    }
    for call in &request.port_calls {
        if let Some(voyage_id) = &call.voyage_id {
            if voyage_id != &request.voyage_id {
                return Err(EngineError::VoyageMismatch {
                    entity: "port call".to_string(),
                    id: call.id.clone(),
                    voyage_id: request.voyage_id.clone(),
                });
            }
        }
    }
    Ok(())
}
