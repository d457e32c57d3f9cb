//! Expense data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Currencies an expense can be recorded in
#[derive(Serialize, Deserialize, sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    USD,
    EUR,
    PLN,
    GBP,
}

/// Expense database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Expense {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub currency: Currency,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub owner_id: Option<i64>,
    pub category_id: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct CreateExpenseRequest {
    pub name: String,
    pub description: Option<String>,
    pub currency: Currency,
    pub amount: f64,
    pub category_id: i64,
}

#[derive(Deserialize, Debug)]
pub struct UpdateExpenseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub currency: Option<Currency>,
    pub amount: Option<f64>,
    pub category_id: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct ListExpensesParams {
    pub category_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct StatisticsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category_id: Option<i64>,
}

/// Statistics for a specific currency
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct CurrencyStats {
    pub currency: Currency,
    pub total_amount: f64,
    pub expense_count: i64,
    pub average_amount: f64,
}

/// Statistics for a specific category
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct CategoryStats {
    pub category_id: i64,
    pub category_name: String,
    pub total_amount: f64,
    pub expense_count: i64,
    pub average_amount: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct DateRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct PeriodSummary {
    pub period_type: String,
    pub period_description: String,
}

/// Complete expense statistics for a time period
#[derive(Serialize, Debug, Clone)]
pub struct ExpenseStatistics {
    pub total_amount: f64,
    pub total_expenses: i64,
    pub average_expense: f64,
    pub date_range: DateRange,
    pub currency_breakdown: Vec<CurrencyStats>,
    pub category_breakdown: Vec<CategoryStats>,
    pub period_summary: PeriodSummary,
}
