use axum::{
    extract::{Path, State},
    Json,
};
use domain::DomainError;
use lookup::LookupResponse;
use tracing::info;

use super::error::ApiError;
use crate::state::AppState;

/// Resolve one order by identifier
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<LookupResponse>, ApiError> {
    info!("Looking up order: {}", order_id);
    let response = state.service.lookup_raw(&order_id).await?;
    Ok(Json(response))
}

/// `/order/` with an empty identifier segment
pub async fn missing_order_id() -> ApiError {
    ApiError::bad_request(DomainError::MissingOrderId.to_string())
}
