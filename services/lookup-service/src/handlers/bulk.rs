use axum::{extract::rejection::JsonRejection, extract::State, Json};
use lookup::{BulkRequest, BulkResponse};
use tracing::info;
use validator::Validate;

use super::error::ApiError;
use crate::state::AppState;

pub async fn bulk_parse(
    State(state): State<AppState>,
    body: Result<Json<BulkRequest>, JsonRejection>,
) -> Result<Json<BulkResponse>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    info!(
        "Bulk request for {} merchants (fetch_details: {})",
        request.merchants.len(),
        request.fetch_details
    );

    Ok(Json(
        state.service.bulk(&request.merchants, request.fetch_details).await,
    ))
}
