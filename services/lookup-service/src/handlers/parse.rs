use axum::{extract::rejection::JsonRejection, extract::State, Json};
use lookup::{ParseRequest, ParseResponse, StatementParseResponse, StatementRequest};
use tracing::info;
use validator::Validate;

use super::error::ApiError;
use crate::state::AppState;

/// Extract an order identifier from one merchant string
pub async fn parse_merchant(
    State(state): State<AppState>,
    body: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParseResponse>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let response = state.service.extract(&request.merchant);
    info!("Parsed merchant text (found: {})", response.found);
    Ok(Json(response))
}

/// Extract the first order identifier from a multi-line statement
pub async fn parse_statement(
    State(state): State<AppState>,
    body: Result<Json<StatementRequest>, JsonRejection>,
) -> Result<Json<StatementParseResponse>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    Ok(Json(state.service.extract_statement(&request.statement)))
}
