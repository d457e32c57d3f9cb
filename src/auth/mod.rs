//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Local registration and login with hashed passwords
//! - JWT access/refresh token issuance and verification
//! - Google OAuth login federation
//! - AuthedUser/ActiveUser extractors for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod password;
pub mod routes;
pub mod tokens;
pub mod validators;


pub use extractors::{ensure_owner, ActiveUser, AuthedUser};
pub use models::User;
pub use routes::auth_routes;
