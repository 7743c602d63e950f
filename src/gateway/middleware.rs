// ============================================================================
// Gateway Middleware
// ============================================================================
//
// require_admin guards the forwarding fallback: a request is only proxied
// when it carries a valid bearer token with the ADMIN role.
//   - missing / malformed / expired / badly signed token -> 401
//   - valid token without ADMIN -> 403
//
// ============================================================================

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::ADMIN_ROLE;
use crate::error::AppError;
use crate::gateway::router::GatewayState;
use crate::routes::extractors::bearer_token;

/// ADMIN bearer-token check ahead of forwarding
pub async fn require_admin(
    State(state): State<Arc<GatewayState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!(path = %path, "Missing or malformed Authorization header");
        AppError::auth("Bearer token required")
    })?;

    let claims = state
        .auth_manager
        .authorize(token, ADMIN_ROLE)
        .map_err(|e| {
            tracing::warn!(error = %e, path = %path, "Token rejected");
            e
        })?;

    tracing::debug!(user = %claims.sub, jti = %claims.jti, path = %path, "Request authorized");

    Ok(next.run(request).await)
}
