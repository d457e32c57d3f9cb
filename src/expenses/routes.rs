//! Expense routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the expenses router
///
/// # Routes
/// - `GET /expenses` - List the current user's expenses
/// - `POST /expenses` - Create an expense
/// - `GET /expenses/statistics` - Aggregate statistics
/// - `GET /expenses/:id` - One expense
/// - `PUT /expenses/:id` - Update an expense
/// - `DELETE /expenses/:id` - Delete an expense
pub fn expenses_routes() -> Router {
    Router::new()
        .route(
            "/expenses",
            get(handlers::get_all_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/statistics",
            get(handlers::get_expense_statistics),
        )
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
}
