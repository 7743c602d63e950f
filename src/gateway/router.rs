// ============================================================================
// Gateway Router
// ============================================================================
//
// Public endpoints:
// - POST /auth/login
// - GET  /health
//
// Everything else falls through to route_request behind require_admin and is
// forwarded by prefix (see RouteRegistry).
//
// ============================================================================

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::AuthManager;
use crate::config::{AuthConfig, GatewayConfig};
use crate::error::{AppError, AppResult};
use crate::gateway::middleware::require_admin;
use crate::gateway::registry::RouteRegistry;
use crate::gateway::service_client::ServiceClient;
use crate::routes;

/// Gateway state, read-only after startup
pub struct GatewayState {
    pub registry: RouteRegistry,
    pub service_client: ServiceClient,
    pub auth_manager: Arc<AuthManager>,
    pub credentials: AuthConfig,
}

impl GatewayState {
    pub fn from_config(config: &GatewayConfig) -> Result<Arc<Self>> {
        let auth_manager = Arc::new(AuthManager::new(&config.jwt)?);
        let service_client = ServiceClient::new(config.upstream_timeout_secs)?;

        Ok(Arc::new(Self {
            registry: RouteRegistry::new(config.routes.clone()),
            service_client,
            auth_manager,
            credentials: config.auth.clone(),
        }))
    }
}

/// Route request to the upstream owning its path prefix
pub async fn route_request(
    State(state): State<Arc<GatewayState>>,
    request: Request<Body>,
) -> AppResult<Response<Body>> {
    let path = request.uri().path().to_string();

    let route = state.registry.resolve(&path).ok_or_else(|| {
        tracing::warn!(path = %path, "No route matches path");
        AppError::Unroutable(path.clone())
    })?;

    state.service_client.forward_request(route, request).await
}

/// Build the gateway application
pub fn create_router(state: Arc<GatewayState>) -> Router {
    let forwarding = Router::new()
        .fallback(route_request)
        .layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(routes::health::liveness))
        .route("/auth/login", post(routes::auth::login))
        .with_state(state)
        .fallback_service(forwarding)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(routes::middleware::request_logging))
                .into_inner(),
        )
}
