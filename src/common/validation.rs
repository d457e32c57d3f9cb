// Common validation types and traits

use super::ApiError;

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
            self.errors.extend(other.errors);
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

/// Validates pagination parameters shared by all listing endpoints
pub fn validate_pagination(skip: i64, limit: i64) -> Result<(), ApiError> {
    let mut result = ValidationResult::new();

    if skip < 0 {
        result.add_error("skip", "skip must be greater than or equal to 0");
    }

    if !(1..=1000).contains(&limit) {
        result.add_error("limit", "limit must be between 1 and 1000");
    }

    if result.is_valid {
        Ok(())
    } else {
        Err(result.into())
    }
}
