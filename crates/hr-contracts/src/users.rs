//! Registration contract

use hr_core::error::ValidationErrors;
use regex::Regex;
use std::sync::LazyLock;

use crate::base::{validate_text, Contract, ValidationResult};

/// Valid email pattern
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

const MAX_NAME_LENGTH: usize = 100;

/// Employee codes with this prefix belong to accounts the portal creates itself
pub const SYSTEM_CODE_PREFIX: &str = "SYSTEM:";
const MAX_PASSWORD_LENGTH: usize = 128;

/// Self-registration input
pub trait Registration: Send + Sync {
    fn employee_code(&self) -> &str;
    fn first_name(&self) -> &str;
    fn last_name(&self) -> &str;
    fn email(&self) -> &str;
    fn password(&self) -> &str;
}

pub struct RegistrationContract {
    password_min_length: usize,
}

impl RegistrationContract {
    pub fn new(password_min_length: usize) -> Self {
        Self {
            password_min_length,
        }
    }

    pub fn validate_email(email: &str, errors: &mut ValidationErrors) {
        if email.is_empty() {
            errors.add("email", "can't be blank");
        } else if !EMAIL_PATTERN.is_match(email) {
            errors.add("email", "is not a valid email address");
        }
    }

    fn validate_password(&self, password: &str, errors: &mut ValidationErrors) {
        let length = password.chars().count();
        if length < self.password_min_length {
            errors.add(
                "password",
                format!(
                    "is too short (minimum is {} characters)",
                    self.password_min_length
                ),
            );
        } else if length > MAX_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("is too long (maximum is {} characters)", MAX_PASSWORD_LENGTH),
            );
        }
    }
}

impl<T: Registration> Contract<T> for RegistrationContract {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_text("employeeCode", entity.employee_code(), 50, &mut errors);
        if entity
            .employee_code()
            .trim()
            .to_ascii_uppercase()
            .starts_with(SYSTEM_CODE_PREFIX)
        {
            errors.add("employeeCode", "is reserved");
        }
        validate_text("firstName", entity.first_name(), MAX_NAME_LENGTH, &mut errors);
        validate_text("lastName", entity.last_name(), MAX_NAME_LENGTH, &mut errors);
        Self::validate_email(entity.email(), &mut errors);
        self.validate_password(entity.password(), &mut errors);

        errors.into_result()
    }
}
