// ============================================================================
// Gateway Configuration
// ============================================================================

use anyhow::{Context, Result};
use subtle::ConstantTimeEq;

use super::{
    optional_env, parse_env_or, required_env, LoggingConfig, DEFAULT_ACCESS_TOKEN_TTL_HOURS,
    DEFAULT_GATEWAY_PORT, DEFAULT_GATEWAY_ROUTES,
};

/// The single credential pair accepted by `POST /auth/login`
#[derive(Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    /// Constant-time comparison against the configured pair.
    /// Both fields are always compared so timing does not reveal which one was wrong.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        bool::from(user_ok & pass_ok)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Token signing configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HS256 shared secret
    pub secret: Option<String>,
    /// RS256 private key (PEM string or path to a PEM file)
    pub private_key: Option<String>,
    /// RS256 public key (PEM string or path to a PEM file)
    pub public_key: Option<String>,
    pub issuer: String,
    pub access_token_ttl_hours: i64,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub port: u16,
    pub auth: AuthConfig,
    pub jwt: JwtConfig,
    /// Ordered (prefix, host) pairs
    pub routes: Vec<(String, String)>,
    /// Upstream request timeout; `None` keeps the HTTP client default
    pub upstream_timeout_secs: Option<u64>,
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        super::load_dotenv();

        let routes_raw =
            std::env::var("GATEWAY_ROUTES").unwrap_or_else(|_| DEFAULT_GATEWAY_ROUTES.to_string());

        Ok(Self {
            port: parse_env_or("PORT", DEFAULT_GATEWAY_PORT)?,
            auth: AuthConfig {
                username: required_env("AUTH_USER")?,
                password: required_env("AUTH_PASSWORD")?,
            },
            jwt: JwtConfig {
                secret: optional_env("JWT_SECRET"),
                private_key: optional_env("JWT_PRIVATE_KEY").map(read_pem),
                public_key: optional_env("JWT_PUBLIC_KEY").map(read_pem),
                issuer: std::env::var("JWT_ISSUER")
                    .unwrap_or_else(|_| "genosentinel-gateway".to_string()),
                access_token_ttl_hours: parse_env_or(
                    "ACCESS_TOKEN_TTL_HOURS",
                    DEFAULT_ACCESS_TOKEN_TTL_HOURS,
                )?,
            },
            routes: parse_routes(&routes_raw).context("Invalid GATEWAY_ROUTES")?,
            upstream_timeout_secs: match optional_env("UPSTREAM_TIMEOUT_SECS") {
                Some(raw) => Some(
                    raw.trim()
                        .parse()
                        .with_context(|| format!("Invalid UPSTREAM_TIMEOUT_SECS: {}", raw))?,
                ),
                None => None,
            },
            logging: LoggingConfig::from_env(),
        })
    }
}

/// Parses `"/prefix=http://host:port,/other=http://host2"` into ordered pairs.
///
/// Order is preserved because routing picks the first matching prefix.
pub fn parse_routes(raw: &str) -> Result<Vec<(String, String)>> {
    let mut routes = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (prefix, host) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Route '{}' is not in prefix=host form", entry))?;
        let prefix = prefix.trim();
        let host = host.trim().trim_end_matches('/');

        if !prefix.starts_with('/') {
            anyhow::bail!("Route prefix '{}' must start with '/'", prefix);
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            anyhow::bail!("Route host '{}' must be an http(s) URL", host);
        }
        if routes.iter().any(|(p, _): &(String, String)| p == prefix) {
            anyhow::bail!("Route prefix '{}' is configured twice", prefix);
        }

        routes.push((prefix.to_string(), host.to_string()));
    }

    if routes.is_empty() {
        anyhow::bail!("At least one route must be configured");
    }

    Ok(routes)
}

/// Keys may be given inline (PEM) or as a path to a PEM file
fn read_pem(value: String) -> String {
    if value.starts_with("-----BEGIN") {
        return value;
    }
    std::fs::read_to_string(&value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, path = %value, "Failed to read key file, using value as-is");
        value
    })
}
