//! Google OAuth federation client
//!
//! Drives the authorization-code exchange against Google's endpoints and
//! normalizes the userinfo response. The CSRF state for each in-flight login
//! lives in the `oauth_states` table, keyed by the nonce itself, and is
//! consumed by a single DELETE on the first callback attempt - a replayed
//! callback finds the row gone and fails closed.

use rand::{distributions::Alphanumeric, Rng};
use reqwest::Client;
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::common::config::OAuthConfig;
use crate::common::safe_email_log;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Minutes a pending OAuth login may wait for its callback
const STATE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Error)]
enum OAuthError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("token exchange rejected: HTTP {0}")]
    ExchangeRejected(u16),

    #[error("userinfo request rejected: HTTP {0}")]
    UserinfoRejected(u16),

    #[error("response missing required fields: {0}")]
    MalformedResponse(String),
}

/// Normalized profile returned by Google's userinfo endpoint
///
/// `id` and `email` are required; their absence fails the whole exchange.
#[derive(Deserialize, Debug, Clone)]
pub struct GoogleProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    #[serde(default)]
    pub verified_email: bool,
}

#[derive(Deserialize, Debug)]
struct GoogleTokenResponse {
    access_token: String,
}

/// Client for the two outbound Google calls of the login flow
#[derive(Clone)]
pub struct GoogleOAuthClient {
    config: OAuthConfig,
    http: Client,
}

impl GoogleOAuthClient {
    pub fn new(config: OAuthConfig, http: Client) -> Self {
        Self { config, http }
    }

    /// Build the authorization URL and a fresh CSRF state nonce
    pub fn build_authorization_url(&self) -> (String, String) {
        let state = generate_state();

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(&state)
        );

        debug!(state = %state, "Generated Google OAuth authorization URL");
        (url, state)
    }

    /// Exchange an authorization code for the user's profile
    ///
    /// Fail-closed: transport errors, non-success statuses and missing
    /// required fields all collapse to None. Callers treat None as
    /// "authentication did not complete".
    pub async fn exchange_and_fetch_profile(&self, code: &str) -> Option<GoogleProfile> {
        match self.try_exchange(code).await {
            Ok(profile) => {
                info!(
                    email = %safe_email_log(&profile.email),
                    "Fetched user info from Google"
                );
                Some(profile)
            }
            Err(e) => {
                warn!(error = %e, "Google OAuth exchange failed");
                None
            }
        }
    }

    async fn try_exchange(&self, code: &str) -> Result<GoogleProfile, OAuthError> {
        let params = [
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", &self.config.redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for access token");

        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::ExchangeRejected(status.as_u16()));
        }

        let token = response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| OAuthError::MalformedResponse(e.to_string()))?;

        debug!("Fetching user info from Google");

        let response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::UserinfoRejected(status.as_u16()));
        }

        response
            .json::<GoogleProfile>()
            .await
            .map_err(|e| OAuthError::MalformedResponse(e.to_string()))
    }
}

/// High-entropy random state nonce binding an authorization request to its
/// callback
fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(43)
        .map(char::from)
        .collect()
}

/// Persist a freshly generated state for one login flow
pub async fn store_state(pool: &SqlitePool, state: &str) -> Result<(), sqlx::Error> {
    // Drop abandoned flows while we are here
    sqlx::query("DELETE FROM oauth_states WHERE expires_at <= datetime('now')")
        .execute(pool)
        .await?;

    sqlx::query(&format!(
        "INSERT INTO oauth_states (state, expires_at) VALUES (?, datetime('now', '+{} minutes'))",
        STATE_TTL_MINUTES
    ))
    .bind(state)
    .execute(pool)
    .await?;

    Ok(())
}

/// Consume a state exactly once, returning whether it was valid
///
/// The DELETE checks presence and expiry atomically, so a concurrent replay
/// of the same state loses the race and is rejected.
pub async fn consume_state(pool: &SqlitePool, state: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "DELETE FROM oauth_states WHERE state = ? AND expires_at > datetime('now') RETURNING state",
    )
    .bind(state)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}
