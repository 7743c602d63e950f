use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};

/// The only role the gateway issues and the only one it accepts for forwarding
pub const ADMIN_ROLE: &str = "ADMIN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // username
    pub roles: Vec<String>, // granted roles
    pub jti: String,        // JWT ID (unique per token)
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub iss: String,        // Issuer
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: i64,
}

pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_token_ttl_hours: i64,
    issuer: String,
}

impl AuthManager {
    pub fn new(config: &JwtConfig) -> Result<Self> {
        let (algorithm, encoding_key, decoding_key) =
            match (&config.private_key, &config.public_key, &config.secret) {
                (Some(private_key), Some(public_key), _) => {
                    tracing::info!("Initializing JWT with RS256 algorithm");

                    let encoding_key = EncodingKey::from_rsa_pem(private_key.as_bytes())
                        .context("Failed to parse JWT_PRIVATE_KEY as RSA PEM")?;
                    let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())
                        .context("Failed to parse JWT_PUBLIC_KEY as RSA PEM")?;

                    (Algorithm::RS256, encoding_key, decoding_key)
                }
                (Some(_), None, _) | (None, Some(_), _) => {
                    anyhow::bail!("JWT_PRIVATE_KEY and JWT_PUBLIC_KEY must be set together");
                }
                (None, None, Some(secret)) => {
                    if secret.len() < 32 {
                        tracing::warn!("JWT_SECRET is shorter than 32 bytes");
                    }
                    tracing::info!("Initializing JWT with HS256 algorithm");

                    (
                        Algorithm::HS256,
                        EncodingKey::from_secret(secret.as_bytes()),
                        DecodingKey::from_secret(secret.as_bytes()),
                    )
                }
                (None, None, None) => {
                    anyhow::bail!(
                        "No JWT configuration provided. Set either:\n\
                        - JWT_PRIVATE_KEY + JWT_PUBLIC_KEY (RS256)\n\
                        - JWT_SECRET (HS256)"
                    );
                }
            };

        if config.access_token_ttl_hours <= 0 {
            anyhow::bail!("ACCESS_TOKEN_TTL_HOURS must be positive");
        }

        Ok(Self {
            encoding_key,
            decoding_key,
            algorithm,
            access_token_ttl_hours: config.access_token_ttl_hours,
            issuer: config.issuer.clone(),
        })
    }

    /// Create an access token for `username` carrying the given roles
    pub fn create_token(&self, username: &str, roles: &[&str]) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.access_token_ttl_hours);
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: username.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            jti: jti.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at: exp.timestamp(),
        })
    }

    /// Verify signature, expiry and issuer. Tokens signed with any other
    /// algorithm than the configured one are rejected.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[self.issuer.clone()]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify the token and require `role` among its claims
    pub fn authorize(&self, token: &str, role: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;
        if !claims.has_role(role) {
            return Err(AppError::forbidden(format!("role {} required", role)));
        }
        Ok(claims)
    }
}
