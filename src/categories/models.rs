//! Category data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::expenses::models::Currency;

/// Category database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Category with usage statistics
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct CategoryWithStats {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub expense_count: i64,
    pub total_amount: f64,
}

#[derive(Deserialize, Debug)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ListCategoriesParams {
    pub include_stats: Option<bool>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct DeleteCategoryParams {
    pub force: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct PaginationParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// One of the user's expenses listed under a category
#[derive(Serialize, Debug)]
pub struct CategoryExpenseItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Currency,
    pub date: Option<String>,
    pub category_name: String,
}
