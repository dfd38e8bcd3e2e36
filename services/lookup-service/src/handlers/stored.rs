use axum::{
    extract::{Path, State},
    Json,
};
use domain::OrderIdentifier;
use read_model::StoredOrder;
use serde::Serialize;

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StoredOrderResponse {
    pub success: bool,
    pub data: StoredOrder,
}

/// Read back the persisted row for an order
pub async fn get_stored_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<StoredOrderResponse>, ApiError> {
    let order_id =
        OrderIdentifier::parse(&order_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    match state.service.stored(&order_id).await? {
        Some(data) => Ok(Json(StoredOrderResponse { success: true, data })),
        None => Err(ApiError::not_found(format!("Order not stored: {}", order_id))),
    }
}
