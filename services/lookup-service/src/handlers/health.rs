use axum::{extract::State, http::StatusCode, Json};
use lookup::HealthReport;

use crate::state::AppState;

/// Health check endpoint; reports configuration only
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    (StatusCode::OK, Json(state.service.health()))
}
