//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
///
/// Does not implement Serialize so the stored password hash can never end up
/// in a response body; handlers answer with [`UserResponse`] instead.
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub hashed_password: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub google_id: Option<String>,
    pub provider: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<String>,
    pub last_login: Option<String>,
}

/// Public view of a user record
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub provider: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<String>,
    pub last_login: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            is_active: user.is_active,
            is_verified: user.is_verified,
            provider: user.provider.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at: user.created_at.clone(),
            last_login: user.last_login.clone(),
        }
    }
}

/// POST /auth/register request body
#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub password: String,
}

/// POST /auth/login request body
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/refresh request body
#[derive(Deserialize, Debug)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Query parameters Google appends to the callback redirect
#[derive(Deserialize, Debug)]
pub struct GoogleCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
