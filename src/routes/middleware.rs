// ============================================================================
// Axum Middleware
// ============================================================================

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// First path segment, e.g. "/clinica" for "/clinica/patients/42"
fn area(path: &str) -> &str {
    match path[1.min(path.len())..].find('/') {
        Some(end) => &path[..end + 1],
        None => path,
    }
}

/// Request logging middleware. Health probes log at debug.
pub async fn request_logging(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();

    if path == "/health" {
        tracing::debug!(status, duration_ms, "Health probe");
    } else {
        tracing::info!(
            method = %method,
            area = %area(&path),
            path = %path,
            status,
            duration_ms,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_is_first_segment() {
        assert_eq!(area("/clinica/patients/42"), "/clinica");
        assert_eq!(area("/genoma"), "/genoma");
        assert_eq!(area("/auth/login"), "/auth");
        assert_eq!(area("/"), "/");
        assert_eq!(area(""), "");
    }
}
