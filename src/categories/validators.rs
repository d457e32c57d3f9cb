use super::models::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::common::{ValidationResult, Validator};

fn validate_name(result: &mut ValidationResult, name: &str) {
    if name.trim().is_empty() {
        result.add_error("name", "Category name is required");
    }

    if name.len() > 255 {
        result.add_error("name", "Category name must not exceed 255 characters");
    }
}

impl Validator<CreateCategoryRequest> for CreateCategoryRequest {
    fn validate(&self, data: &CreateCategoryRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        validate_name(&mut result, &data.name);
        result
    }
}

impl Validator<UpdateCategoryRequest> for UpdateCategoryRequest {
    fn validate(&self, data: &UpdateCategoryRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(name) = &data.name {
            validate_name(&mut result, name);
        }

        result
    }
}
