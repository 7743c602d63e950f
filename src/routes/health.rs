// ============================================================================
// Health Routes
// ============================================================================
//
// GET /health answers {"status":"ok"}; data services answer 503 with
// {"status":"unavailable"} when their store cannot be reached.
//
// ============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// GET /health for processes without a backing store
pub async fn liveness() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

/// Turn a store ping result into the health response
pub fn from_ping(result: anyhow::Result<()>) -> Response {
    match result {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}
