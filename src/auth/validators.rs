use regex::Regex;

use super::models::RegisterRequest;
use crate::common::{ValidationResult, Validator};

fn email_is_valid(email: &str) -> bool {
    // Shape check only; deliverability is not our problem
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

impl Validator<RegisterRequest> for RegisterRequest {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        } else if !email_is_valid(&data.email) {
            result.add_error("email", "Email must be a valid email address");
        }

        if data.password.len() < 8 {
            result.add_error("password", "Password must be at least 8 characters");
        }

        if let Some(username) = &data.username {
            if username.trim().is_empty() {
                result.add_error("username", "Username must not be empty when provided");
            }

            if username.len() > 50 {
                result.add_error("username", "Username must not exceed 50 characters");
            }
        }

        result
    }
}
