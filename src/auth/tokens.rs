//! JWT creation and verification
//!
//! Access and refresh tokens share the signing key and encoding; the `type`
//! claim is what keeps them apart. Verification checks it against the kind
//! the caller asked for, so a refresh token presented as an access token is
//! rejected even though its signature is valid.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::common::config::JwtConfig;
use crate::common::safe_email_log;

/// JWT claims structure
///
/// Claim fields are optional on the decode side so their absence surfaces as
/// a named verification failure instead of a parse error.
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub exp: usize,
    #[serde(rename = "type")]
    pub token_type: Option<String>,
}

/// The two token kinds issued by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Why a token failed verification
///
/// Every reason collapses to the same 401 at the HTTP layer, but they stay
/// distinguishable here so tests and logs can tell them apart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
    #[error("token type mismatch")]
    WrongKind,
    #[error("missing {0} claim")]
    MissingClaim(&'static str),
    #[error("subject is not a valid user id")]
    InvalidSubject,
}

/// Identity recovered from a successfully verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: i64,
    pub email: String,
}

/// Access/refresh token pair issued on login and refresh
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Creates and verifies signed tokens using an immutable [`JwtConfig`]
#[derive(Clone)]
pub struct TokenCodec {
    config: JwtConfig,
}

impl TokenCodec {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    fn default_ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => Duration::minutes(self.config.access_token_expire_minutes),
            TokenKind::Refresh => Duration::days(self.config.refresh_token_expire_days),
        }
    }

    fn create_token(
        &self,
        user_id: i64,
        email: &str,
        kind: TokenKind,
        ttl: Option<Duration>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let expire = Utc::now() + ttl.unwrap_or_else(|| self.default_ttl(kind));

        // The JWT sub claim must be a string, so the numeric user id is
        // string-encoded and parsed back on verification.
        let claims = Claims {
            sub: Some(user_id.to_string()),
            email: Some(email.to_string()),
            exp: expire.timestamp() as usize,
            token_type: Some(kind.as_str().to_string()),
        };

        let token = encode(
            &Header::new(self.config.algorithm),
            &claims,
            &EncodingKey::from_secret(self.config.secret_key.as_bytes()),
        )?;

        debug!(kind = kind.as_str(), expires_at = %expire, "Token created");
        Ok(token)
    }

    /// Create an access token; `ttl` overrides the configured default
    pub fn create_access_token(
        &self,
        user_id: i64,
        email: &str,
        ttl: Option<Duration>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.create_token(user_id, email, TokenKind::Access, ttl)
    }

    /// Create a refresh token; `ttl` overrides the configured default
    pub fn create_refresh_token(
        &self,
        user_id: i64,
        email: &str,
        ttl: Option<Duration>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.create_token(user_id, email, TokenKind::Refresh, ttl)
    }

    /// Verify a token of the expected kind and recover its identity claims
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<VerifiedToken, TokenError> {
        let mut validation = Validation::new(self.config.algorithm);
        // No leeway: a token is invalid from its exact expiry instant
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret_key.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = data.claims;

        match claims.token_type.as_deref() {
            Some(found) if found == expected.as_str() => {}
            found => {
                warn!(
                    expected = expected.as_str(),
                    found = ?found,
                    "Token type mismatch"
                );
                return Err(TokenError::WrongKind);
            }
        }

        let sub = claims.sub.ok_or(TokenError::MissingClaim("sub"))?;
        let email = claims.email.ok_or(TokenError::MissingClaim("email"))?;

        let user_id: i64 = sub.parse().map_err(|_| TokenError::InvalidSubject)?;

        Ok(VerifiedToken { user_id, email })
    }

    /// Create both tokens for a user in one shot
    pub fn issue_pair(
        &self,
        user_id: i64,
        email: &str,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let access_token = self.create_access_token(user_id, email, None)?;
        let refresh_token = self.create_refresh_token(user_id, email, None)?;

        debug!(
            user_id = user_id,
            email = %safe_email_log(email),
            "Token pair issued"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in: self.config.access_token_expire_minutes * 60,
        })
    }
}
