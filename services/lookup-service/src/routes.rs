use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use common::metrics;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::handlers::{self, error::ApiError};
use crate::state::AppState;

const PUBLIC_PATHS: [&str; 2] = ["/health", "/metrics"];

const AVAILABLE_ENDPOINTS: [&str; 7] = [
    "POST /parse",
    "POST /parse/statement",
    "GET /order/:id",
    "POST /bulk",
    "GET /stored/:id",
    "GET /health",
    "GET /metrics",
];

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(metrics) => (StatusCode::OK, metrics),
        Err(e) => {
            tracing::error!("Failed to gather metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, String::from("Failed to gather metrics"))
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "available_endpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}

/// Bearer-token gate, active only when an API key is configured
async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    if request.method() == Method::OPTIONS || PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map_or(false, |token| token.trim() == expected);

    if authorized {
        next.run(request).await
    } else {
        warn!("Rejected unauthorized request to {}", request.uri().path());
        ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(metrics_handler))

        // Extraction
        .route("/parse", post(handlers::parse::parse_merchant))
        .route("/parse/statement", post(handlers::parse::parse_statement))
        .route("/bulk", post(handlers::bulk::bulk_parse))

        // Lookups
        .route("/order/", get(handlers::order::missing_order_id))
        .route("/order/:id", get(handlers::order::get_order))
        .route("/stored/:id", get(handlers::stored::get_stored_order))

        .fallback(not_found)

        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
