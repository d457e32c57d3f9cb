use chrono::{NaiveDate, NaiveDateTime};

use super::models::{CreateExpenseRequest, UpdateExpenseRequest};
use crate::common::{ApiError, ValidationResult, Validator};

fn validate_name(result: &mut ValidationResult, name: &str) {
    if name.trim().is_empty() {
        result.add_error("name", "Expense name is required");
    }

    if name.len() > 255 {
        result.add_error("name", "Expense name must not exceed 255 characters");
    }
}

fn validate_amount(result: &mut ValidationResult, amount: f64) {
    if !amount.is_finite() || amount <= 0.0 {
        result.add_error("amount", "Amount must be a positive number");
    }
}

impl Validator<CreateExpenseRequest> for CreateExpenseRequest {
    fn validate(&self, data: &CreateExpenseRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        validate_name(&mut result, &data.name);
        validate_amount(&mut result, data.amount);
        result
    }
}

impl Validator<UpdateExpenseRequest> for UpdateExpenseRequest {
    fn validate(&self, data: &UpdateExpenseRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(name) = &data.name {
            validate_name(&mut result, name);
        }

        if let Some(amount) = data.amount {
            validate_amount(&mut result, amount);
        }

        result
    }
}

/// Parse a date filter given as `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`
pub fn parse_date_param(field: &str, raw: &str) -> Result<NaiveDateTime, ApiError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }

    let mut result = ValidationResult::new();
    result.add_error(
        field,
        "Date must be formatted as YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
    );
    Err(result.into())
}
