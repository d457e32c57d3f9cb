//! Category handlers
//!
//! Categories are a shared namespace rather than per-user; ownership
//! filtering applies to the expenses listed under them.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{
    Category, CategoryExpenseItem, CategoryWithStats, CreateCategoryRequest, DeleteCategoryParams,
    ListCategoriesParams, PaginationParams, UpdateCategoryRequest,
};
use crate::auth::ActiveUser;
use crate::common::{validate_pagination, ApiError, AppState, Validator};
use crate::expenses::models::Expense;

const STATS_SELECT: &str = r#"
    SELECT c.id, c.name, c.description,
           COUNT(e.id) AS expense_count,
           CAST(COALESCE(SUM(e.amount), 0) AS REAL) AS total_amount
    FROM categories c
    LEFT JOIN expenses e ON c.id = e.category_id
"#;

/// GET /categories - All categories, optionally with usage statistics
pub async fn get_categories(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: ActiveUser,
    Query(params): Query<ListCategoriesParams>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(100);
    validate_pagination(skip, limit)?;

    if params.include_stats.unwrap_or(false) {
        let sql = format!(
            "{} GROUP BY c.id, c.name, c.description ORDER BY c.id LIMIT ? OFFSET ?",
            STATS_SELECT
        );
        let categories: Vec<CategoryWithStats> = sqlx::query_as(&sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(Json(categories).into_response())
    } else {
        let categories: Vec<Category> =
            sqlx::query_as("SELECT * FROM categories ORDER BY id LIMIT ? OFFSET ?")
                .bind(limit)
                .bind(skip)
                .fetch_all(&state.db)
                .await
                .map_err(ApiError::DatabaseError)?;

        Ok(Json(categories).into_response())
    }
}

/// GET /categories/:id - One category with usage statistics
pub async fn get_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: ActiveUser,
    Path(category_id): Path<i64>,
) -> Result<Json<CategoryWithStats>, ApiError> {
    let state = state_lock.read().await.clone();

    let sql = format!(
        "{} WHERE c.id = ? GROUP BY c.id, c.name, c.description",
        STATS_SELECT
    );
    let category: Option<CategoryWithStats> = sqlx::query_as(&sql)
        .bind(category_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    match category {
        Some(c) => Ok(Json(c)),
        None => Err(ApiError::NotFound(format!(
            "Category with id {} not found",
            category_id
        ))),
    }
}

/// POST /categories - Create a new category
pub async fn create_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: ActiveUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let existing: Option<Category> = sqlx::query_as("SELECT * FROM categories WHERE name = ?")
        .bind(&payload.name)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if existing.is_some() {
        warn!(name = %payload.name, "Category creation failed - name already exists");
        return Err(ApiError::BadRequest(format!(
            "Category with name '{}' already exists",
            payload.name
        )));
    }

    let result = sqlx::query("INSERT INTO categories (name, description) VALUES (?, ?)")
        .bind(&payload.name)
        .bind(&payload.description)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let category: Category = sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(category_id = category.id, name = %category.name, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /categories/:id - Update an existing category
pub async fn update_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: ActiveUser,
    Path(category_id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let existing: Option<Category> = sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if existing.is_none() {
        return Err(ApiError::NotFound(format!(
            "Category with id {} not found",
            category_id
        )));
    }

    if let Some(new_name) = &payload.name {
        let conflict: Option<Category> =
            sqlx::query_as("SELECT * FROM categories WHERE name = ? AND id != ?")
                .bind(new_name)
                .bind(category_id)
                .fetch_optional(&state.db)
                .await
                .map_err(ApiError::DatabaseError)?;

        if conflict.is_some() {
            return Err(ApiError::BadRequest(format!(
                "Category with name '{}' already exists",
                new_name
            )));
        }
    }

    sqlx::query(
        r#"
        UPDATE categories
        SET name = COALESCE(?, name), description = COALESCE(?, description)
        WHERE id = ?
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(category_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let category: Category = sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(category))
}

/// DELETE /categories/:id - Delete a category
///
/// Refused while expenses reference it unless `force=true`, which detaches
/// those expenses instead of deleting them.
pub async fn delete_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: ActiveUser,
    Path(category_id): Path<i64>,
    Query(params): Query<DeleteCategoryParams>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();
    let force = params.force.unwrap_or(false);

    let category: Option<Category> = sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let category = match category {
        Some(c) => c,
        None => {
            return Err(ApiError::NotFound(format!(
                "Category with id {} not found",
                category_id
            )))
        }
    };

    let (expense_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM expenses WHERE category_id = ?")
            .bind(category_id)
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    if expense_count > 0 && !force {
        return Err(ApiError::BadRequest(format!(
            "Cannot delete category '{}' as it has {} associated expenses. Use force=true to delete anyway.",
            category.name, expense_count
        )));
    }

    if expense_count > 0 && force {
        sqlx::query("UPDATE expenses SET category_id = NULL WHERE category_id = ?")
            .bind(category_id)
            .execute(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;
    }

    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(category_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        category_id = category_id,
        name = %category.name,
        detached_expenses = expense_count,
        "Category deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// GET /categories/:id/expenses - The current user's expenses in a category
pub async fn get_category_expenses(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: ActiveUser,
    Path(category_id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<CategoryExpenseItem>>, ApiError> {
    let state = state_lock.read().await.clone();

    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(100);
    validate_pagination(skip, limit)?;

    let category: Option<Category> = sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let category = match category {
        Some(c) => c,
        None => {
            return Err(ApiError::NotFound(format!(
                "Category with id {} not found",
                category_id
            )))
        }
    };

    let expenses: Vec<Expense> = sqlx::query_as(
        "SELECT * FROM expenses WHERE category_id = ? AND owner_id = ? ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(category_id)
    .bind(user.user.id)
    .bind(limit)
    .bind(skip)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let items = expenses
        .into_iter()
        .map(|e| CategoryExpenseItem {
            id: e.id,
            name: e.name,
            description: e.description,
            amount: e.amount,
            currency: e.currency,
            date: e.date,
            category_name: category.name.clone(),
        })
        .collect();

    Ok(Json(items))
}
