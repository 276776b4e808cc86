//! Base contract system

use hr_core::error::ValidationErrors;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Reject blank values and values longer than `max` characters
pub fn validate_text(field: &str, value: &str, max: usize, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(field, "can't be blank");
    } else if value.chars().count() > max {
        errors.add(field, format!("is too long (maximum is {} characters)", max));
    }
}

/// Like [`validate_text`] but `None` is accepted
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
    errors: &mut ValidationErrors,
) {
    if let Some(value) = value {
        if value.chars().count() > max {
            errors.add(field, format!("is too long (maximum is {} characters)", max));
        }
    }
}
