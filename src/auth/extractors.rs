//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::User;
use super::tokens::TokenKind;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Validates the bearer access token and loads the user it names. Each gate
/// rejects on its own: missing credential, failed verification, vanished
/// user (all 401), then disabled account (403).
#[derive(Debug)]
pub struct AuthedUser {
    pub user: User,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized(
                    "Authorization header missing. Please provide: Authorization: Bearer <token>"
                        .to_string(),
                ));
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = token.strip_prefix("Bearer ").unwrap_or(&token);

        let verified = match app_state.tokens.verify(bare_token, TokenKind::Access) {
            Ok(v) => v,
            Err(reason) => {
                warn!(reason = %reason, "Access token verification failed");
                return Err(ApiError::Unauthorized(
                    "Invalid token. Please login again to get a fresh token.".to_string(),
                ));
            }
        };

        let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(verified.user_id)
            .fetch_optional(&app_state.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    user_id = verified.user_id,
                    "Database error during user lookup in authentication"
                );
                ApiError::DatabaseError(e)
            })?;

        let user = match user {
            Some(u) => u,
            None => {
                warn!(
                    user_id = verified.user_id,
                    "Authentication failed: user not found in database"
                );
                return Err(ApiError::Unauthorized(
                    "User not found. Token may be for a deleted user.".to_string(),
                ));
            }
        };

        if !user.is_active {
            warn!(
                user_id = user.id,
                email = %safe_email_log(&user.email),
                "Authentication rejected: user account is disabled"
            );
            return Err(ApiError::Forbidden(
                "User account is disabled. Please contact support.".to_string(),
            ));
        }

        debug!(
            user_id = user.id,
            email = %safe_email_log(&user.email),
            "User authentication successful via extractor"
        );

        Ok(AuthedUser { user })
    }
}

/// Active user extractor
///
/// Composes on [`AuthedUser`] and re-checks the active flag, so callers
/// reaching this entry point directly still cannot act for a disabled
/// account.
#[derive(Debug)]
pub struct ActiveUser {
    pub user: User,
}

#[async_trait]
impl<S> FromRequestParts<S> for ActiveUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authed = AuthedUser::from_request_parts(parts, state).await?;

        if !authed.user.is_active {
            warn!(
                email = %safe_email_log(&authed.user.email),
                "Inactive user attempted access"
            );
            return Err(ApiError::BadRequest("Inactive user".to_string()));
        }

        Ok(ActiveUser { user: authed.user })
    }
}

/// Ownership predicate applied by every per-row expense endpoint
pub fn ensure_owner(user: &User, owner_id: Option<i64>) -> Result<(), ApiError> {
    if owner_id == Some(user.id) {
        Ok(())
    } else {
        warn!(
            user_id = user.id,
            owner_id = ?owner_id,
            "Ownership check failed"
        );
        Err(ApiError::Forbidden(
            "You can only access your own expenses".to_string(),
        ))
    }
}
