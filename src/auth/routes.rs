//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /auth/help` - Token usage help
/// - `POST /auth/register` - Register a new local account
/// - `POST /auth/login` - Email + password login
/// - `POST /auth/refresh` - Exchange a refresh token for a new pair
/// - `GET /auth/google` - Start the Google OAuth flow
/// - `GET /auth/google/callback` - Complete the Google OAuth flow
/// - `GET /auth/me` - Current user information
/// - `GET /auth/token-info` - Token diagnostics
/// - `POST /auth/logout` - Stateless logout
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/help", get(handlers::auth_help))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/google", get(handlers::google_login))
        .route("/auth/google/callback", get(handlers::google_callback))
        .route("/auth/me", get(handlers::me))
        .route("/auth/token-info", get(handlers::token_info))
        .route("/auth/logout", post(handlers::logout))
}
