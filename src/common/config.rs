// src/common/config.rs
//! Immutable configuration objects built once at startup from environment
//! variables and handed to the components that need them.

use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Signing configuration for the token codec
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
}

impl JwtConfig {
    /// Reads JWT_SECRET, JWT_ALGORITHM, JWT_ACCESS_TOKEN_EXPIRE_MINUTES and
    /// JWT_REFRESH_TOKEN_EXPIRE_DAYS, falling back to development defaults.
    pub fn from_env() -> Self {
        let secret_key =
            env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());

        let algorithm = env::var("JWT_ALGORITHM")
            .ok()
            .and_then(|raw| match Algorithm::from_str(&raw) {
                Ok(alg) => Some(alg),
                Err(_) => {
                    warn!(algorithm = %raw, "Unknown JWT_ALGORITHM, falling back to HS256");
                    None
                }
            })
            .unwrap_or(Algorithm::HS256);

        let access_token_expire_minutes = env::var("JWT_ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let refresh_token_expire_days = env::var("JWT_REFRESH_TOKEN_EXPIRE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(7);

        Self {
            secret_key,
            algorithm,
            access_token_expire_minutes,
            refresh_token_expire_days,
        }
    }
}

/// Google OAuth client configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthConfig {
    /// Reads GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI.
    /// Returns None when the client id or secret is absent, which leaves
    /// OAuth login unconfigured rather than half-configured.
    pub fn from_env() -> Option<Self> {
        let client_id = env::var("GOOGLE_CLIENT_ID").ok().filter(|v| !v.is_empty())?;
        let client_secret = env::var("GOOGLE_CLIENT_SECRET")
            .ok()
            .filter(|v| !v.is_empty())?;

        let redirect_uri = env::var("GOOGLE_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:8000/auth/google/callback".to_string());

        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}
