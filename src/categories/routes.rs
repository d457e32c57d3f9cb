//! Category routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the categories router
///
/// # Routes
/// - `GET /categories` - List categories (optional usage stats)
/// - `POST /categories` - Create a category
/// - `GET /categories/:id` - One category with usage stats
/// - `PUT /categories/:id` - Update a category
/// - `DELETE /categories/:id` - Delete a category (force-detach optional)
/// - `GET /categories/:id/expenses` - Current user's expenses in a category
pub fn categories_routes() -> Router {
    Router::new()
        .route(
            "/categories",
            get(handlers::get_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/categories/:id/expenses",
            get(handlers::get_category_expenses),
        )
}
