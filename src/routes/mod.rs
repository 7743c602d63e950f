// ============================================================================
// Shared HTTP Layer
// ============================================================================
//
// Pieces every binary mounts on its axum router:
// - auth.rs: POST /auth/login (gateway)
// - extractors.rs: JSON / path / query extractors that reject with AppError
// - health.rs: GET /health helpers
// - middleware.rs: request logging
//
// ============================================================================

pub mod auth;
pub mod extractors;
pub mod health;
pub mod middleware;
