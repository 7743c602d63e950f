// ============================================================================
// Service Client
// ============================================================================
//
// HTTP client that forwards a gateway request to its upstream host and
// hands the upstream response back unchanged. 4xx/5xx answers from the
// upstream are ordinary responses here: status, headers and body pass through
// verbatim. Only transport failures become gateway errors.
//
// ============================================================================

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request, Response};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::MAX_REQUEST_BODY_SIZE;
use crate::error::{AppError, AppResult};
use crate::gateway::registry::Route;

/// Connection-scoped headers that never travel across a proxy hop
const HOP_BY_HOP_HEADERS: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name)
        || *name == header::UPGRADE
        || name.as_str().eq_ignore_ascii_case("keep-alive")
}

/// HTTP client for forwarding requests to upstream services
#[derive(Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
}

impl ServiceClient {
    /// `timeout_secs = None` keeps the client without a request timeout
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            // Redirects are the caller's business, not the gateway's
            .redirect(reqwest::redirect::Policy::none());

        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Forward HTTP request to the route's host
    pub async fn forward_request(
        &self,
        route: &Route,
        request: Request<Body>,
    ) -> AppResult<Response<Body>> {
        let (parts, body) = request.into_parts();
        let target_url = route.target_url(parts.uri.path(), parts.uri.query());

        let body_bytes = axum::body::to_bytes(body, MAX_REQUEST_BODY_SIZE)
            .await
            .map_err(|e| AppError::validation(format!("Unreadable request body: {}", e)))?;

        let mut outbound = self
            .client
            .request(parts.method.clone(), &target_url)
            .headers(forwardable_headers(&parts.headers));

        if !body_bytes.is_empty() {
            outbound = outbound.body(body_bytes);
        }

        debug!(
            method = %parts.method,
            prefix = %route.prefix,
            target = %target_url,
            "Forwarding request"
        );

        let upstream = outbound.send().await.map_err(|e| {
            warn!(
                error = %e,
                target = %target_url,
                "Upstream request failed"
            );
            AppError::Reqwest(e)
        })?;

        let status = upstream.status();
        if !status.is_success() {
            debug!(
                status = status.as_u16(),
                target = %target_url,
                "Passing upstream error through"
            );
        }

        let mut response = Response::builder().status(status);
        for (key, value) in upstream.headers().iter() {
            if !is_hop_by_hop(key) {
                response = response.header(key, value);
            }
        }

        let body_bytes = upstream.bytes().await.map_err(|e| {
            warn!(error = %e, target = %target_url, "Failed to read upstream body");
            AppError::Reqwest(e)
        })?;

        response
            .body(Body::from(body_bytes))
            .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
    }
}

/// Inbound headers minus `Host` (derived from the target URL) and hop-by-hop headers
fn forwardable_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (key, value) in inbound.iter() {
        if *key != header::HOST && !is_hop_by_hop(key) {
            headers.append(key.clone(), value.clone());
        }
    }
    headers
}
