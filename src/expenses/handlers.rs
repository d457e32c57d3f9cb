//! Expense handlers
//!
//! Every per-row read and mutation runs through the shared ownership
//! predicate; listings and statistics are scoped to the current user in SQL.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{
    CategoryStats, CreateExpenseRequest, CurrencyStats, DateRange, Expense, ExpenseStatistics,
    ListExpensesParams, PeriodSummary, StatisticsParams, UpdateExpenseRequest,
};
use super::validators::parse_date_param;
use crate::auth::{ensure_owner, ActiveUser};
use crate::categories::models::Category;
use crate::common::{validate_pagination, ApiError, AppState, Validator};

/// Stored date format, also used for filter comparisons
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

async fn fetch_expense(pool: &sqlx::SqlitePool, expense_id: i64) -> Result<Expense, ApiError> {
    let expense: Option<Expense> = sqlx::query_as("SELECT * FROM expenses WHERE id = ?")
        .bind(expense_id)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)?;

    expense.ok_or_else(|| {
        ApiError::NotFound(format!("Expense with id {} not found", expense_id))
    })
}

async fn ensure_category_exists(
    pool: &sqlx::SqlitePool,
    category_id: i64,
) -> Result<(), ApiError> {
    let category: Option<Category> = sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)?;

    if category.is_none() {
        return Err(ApiError::BadRequest(format!(
            "Category with id {} not found",
            category_id
        )));
    }

    Ok(())
}

/// GET /expenses - The current user's expenses with optional filtering and
/// pagination
pub async fn get_all_expenses(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: ActiveUser,
    Query(params): Query<ListExpensesParams>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let state = state_lock.read().await.clone();

    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(100);
    validate_pagination(skip, limit)?;

    let expenses: Vec<Expense> = match params.category_id {
        Some(category_id) => sqlx::query_as(
            "SELECT * FROM expenses WHERE owner_id = ? AND category_id = ? ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(user.user.id)
        .bind(category_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?,
        None => sqlx::query_as(
            "SELECT * FROM expenses WHERE owner_id = ? ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(user.user.id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?,
    };

    Ok(Json(expenses))
}

/// GET /expenses/statistics - Aggregate statistics for the current user in a
/// specified time frame
pub async fn get_expense_statistics(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: ActiveUser,
    Query(params): Query<StatisticsParams>,
) -> Result<Json<ExpenseStatistics>, ApiError> {
    let state = state_lock.read().await.clone();

    let start = params
        .start_date
        .as_deref()
        .map(|raw| parse_date_param("start_date", raw))
        .transpose()?;
    let end = params
        .end_date
        .as_deref()
        .map(|raw| parse_date_param("end_date", raw))
        .transpose()?;

    let start_str = start.map(|dt| dt.format(DATE_FORMAT).to_string());
    let end_str = end.map(|dt| dt.format(DATE_FORMAT).to_string());

    // Filter conditions shared by all three aggregate queries; the owner
    // condition always applies
    let mut where_sql = String::from("e.owner_id = ?");
    if start_str.is_some() {
        where_sql.push_str(" AND e.date >= ?");
    }
    if end_str.is_some() {
        where_sql.push_str(" AND e.date <= ?");
    }
    if params.category_id.is_some() {
        where_sql.push_str(" AND e.category_id = ?");
    }

    macro_rules! bind_filters {
        ($query:expr) => {{
            let mut q = $query.bind(user.user.id);
            if let Some(s) = &start_str {
                q = q.bind(s);
            }
            if let Some(e) = &end_str {
                q = q.bind(e);
            }
            if let Some(c) = params.category_id {
                q = q.bind(c);
            }
            q
        }};
    }

    let totals_sql = format!(
        r#"
        SELECT CAST(COALESCE(SUM(e.amount), 0) AS REAL) AS total_amount,
               COUNT(e.id) AS total_expenses,
               CAST(COALESCE(AVG(e.amount), 0) AS REAL) AS average_expense
        FROM expenses e
        WHERE {}
        "#,
        where_sql
    );
    let (total_amount, total_expenses, average_expense): (f64, i64, f64) =
        bind_filters!(sqlx::query_as(&totals_sql))
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    let currency_sql = format!(
        r#"
        SELECT e.currency,
               CAST(COALESCE(SUM(e.amount), 0) AS REAL) AS total_amount,
               COUNT(e.id) AS expense_count,
               CAST(COALESCE(AVG(e.amount), 0) AS REAL) AS average_amount
        FROM expenses e
        WHERE {}
        GROUP BY e.currency
        "#,
        where_sql
    );
    let currency_breakdown: Vec<CurrencyStats> = bind_filters!(sqlx::query_as(&currency_sql))
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let category_sql = format!(
        r#"
        SELECT e.category_id,
               c.name AS category_name,
               CAST(COALESCE(SUM(e.amount), 0) AS REAL) AS total_amount,
               COUNT(e.id) AS expense_count,
               CAST(COALESCE(AVG(e.amount), 0) AS REAL) AS average_amount
        FROM expenses e
        JOIN categories c ON e.category_id = c.id
        WHERE {}
        GROUP BY e.category_id, c.name
        "#,
        where_sql
    );
    let category_breakdown: Vec<CategoryStats> = bind_filters!(sqlx::query_as(&category_sql))
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(ExpenseStatistics {
        total_amount,
        total_expenses,
        average_expense,
        date_range: DateRange {
            start_date: start_str,
            end_date: end_str,
        },
        currency_breakdown,
        category_breakdown,
        period_summary: period_summary(start, end),
    }))
}

fn period_summary(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> PeriodSummary {
    match (start, end) {
        (Some(start), Some(end)) => {
            let days = (end - start).num_days();
            PeriodSummary {
                period_type: format!("Custom ({} days)", days),
                period_description: format!("From {} to {}", start.date(), end.date()),
            }
        }
        (Some(start), None) => PeriodSummary {
            period_type: "From date onwards".to_string(),
            period_description: format!("From {} onwards", start.date()),
        },
        (None, Some(end)) => PeriodSummary {
            period_type: "Up to date".to_string(),
            period_description: format!("Up to {}", end.date()),
        },
        (None, None) => PeriodSummary {
            period_type: "All time".to_string(),
            period_description: "All expenses".to_string(),
        },
    }
}

/// GET /expenses/:id - A single expense, own expenses only
pub async fn get_expense(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: ActiveUser,
    Path(expense_id): Path<i64>,
) -> Result<Json<Expense>, ApiError> {
    let state = state_lock.read().await.clone();

    let expense = fetch_expense(&state.db, expense_id).await?;
    ensure_owner(&user.user, expense.owner_id)?;

    Ok(Json(expense))
}

/// POST /expenses - Create a new expense for the current user
pub async fn create_expense(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: ActiveUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    ensure_category_exists(&state.db, payload.category_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO expenses (name, description, currency, amount, category_id, owner_id, date)
        VALUES (?, ?, ?, ?, ?, ?, datetime('now'))
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.currency)
    .bind(payload.amount)
    .bind(payload.category_id)
    .bind(user.user.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let expense: Expense = sqlx::query_as("SELECT * FROM expenses WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        expense_id = expense.id,
        owner_id = user.user.id,
        "Expense created"
    );

    Ok((StatusCode::CREATED, Json(expense)))
}

/// PUT /expenses/:id - Update an expense, own expenses only
pub async fn update_expense(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: ActiveUser,
    Path(expense_id): Path<i64>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<Json<Expense>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let expense = fetch_expense(&state.db, expense_id).await?;
    ensure_owner(&user.user, expense.owner_id)?;

    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&state.db, category_id).await?;
    }

    sqlx::query(
        r#"
        UPDATE expenses
        SET name = COALESCE(?, name),
            description = COALESCE(?, description),
            currency = COALESCE(?, currency),
            amount = COALESCE(?, amount),
            category_id = COALESCE(?, category_id)
        WHERE id = ?
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.currency)
    .bind(payload.amount)
    .bind(payload.category_id)
    .bind(expense_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let expense: Expense = sqlx::query_as("SELECT * FROM expenses WHERE id = ?")
        .bind(expense_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(expense))
}

/// DELETE /expenses/:id - Delete an expense, own expenses only
pub async fn delete_expense(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: ActiveUser,
    Path(expense_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let expense = fetch_expense(&state.db, expense_id).await?;
    ensure_owner(&user.user, expense.owner_id)?;

    sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(expense_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        expense_id = expense_id,
        owner_id = user.user.id,
        "Expense deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
