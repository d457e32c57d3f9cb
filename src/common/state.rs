// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;

use crate::auth::oauth::GoogleOAuthClient;
use crate::auth::tokens::TokenCodec;

/// Application state containing the database pool, outbound HTTP client and
/// the auth components built from startup configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub tokens: TokenCodec,
    pub oauth: Option<GoogleOAuthClient>,
}
