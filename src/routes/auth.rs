// ============================================================================
// Authentication Routes
// ============================================================================
//
// POST /auth/login: compare against the configured credential pair and
// issue an ADMIN access token.
//
// ============================================================================

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::ADMIN_ROLE;
use crate::error::{AppError, AppResult};
use crate::gateway::GatewayState;
use crate::routes::extractors::JsonBody;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub roles: Vec<String>,
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if !state
        .credentials
        .verify(&request.username, &request.password)
    {
        tracing::warn!(username = %request.username, "Login rejected");
        return Err(AppError::auth("Bad credentials"));
    }

    let issued = state
        .auth_manager
        .create_token(&request.username, &[ADMIN_ROLE])?;

    tracing::info!(username = %request.username, jti = %issued.jti, "Login succeeded");

    Ok(Json(LoginResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        roles: vec![ADMIN_ROLE.to_string()],
    }))
}
