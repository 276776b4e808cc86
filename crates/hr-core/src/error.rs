//! Core error types for the HR portal

use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all portal operations
#[derive(Error, Debug)]
pub enum HrError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HrError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        HrError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        HrError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        HrError::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HrError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a single field validation error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        HrError::Validation(errors)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            HrError::NotFound { .. } => 404,
            HrError::Unauthorized { .. } => 401,
            HrError::Forbidden { .. } => 403,
            HrError::Validation(_) => 422,
            HrError::Conflict { .. } => 409,
            HrError::Database(_) | HrError::Internal(_) | HrError::Config(_) => 500,
            HrError::ExternalService { .. } => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            HrError::NotFound { .. } => "not_found",
            HrError::Unauthorized { .. } => "unauthorized",
            HrError::Forbidden { .. } => "forbidden",
            HrError::Validation(_) => "validation_failed",
            HrError::Conflict { .. } => "conflict",
            HrError::Database(_) => "database_error",
            HrError::ExternalService { .. } => "external_service_error",
            HrError::Internal(_) => "internal_error",
            HrError::Config(_) => "configuration_error",
        }
    }
}

/// Validation errors collection, keyed by field name
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: BTreeMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// Turn an accumulated set of errors into a `Result`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "can't be blank");
        errors.add_base("Request is malformed");

        assert!(errors.has_error("title"));
        assert!(!errors.has_error("content"));
        assert_eq!(
            errors.full_messages(),
            vec!["Request is malformed", "title can't be blank"]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationErrors::new();
        a.add("email", "is invalid");
        let mut b = ValidationErrors::new();
        b.add("email", "is taken");
        b.add("password", "is too short");

        a.merge(b);
        assert_eq!(a.get("email").map(Vec::len), Some(2));
        assert!(a.has_error("password"));
    }

    #[test]
    fn test_empty_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(HrError::not_found("Complaint", 4).status_code(), 404);
        assert_eq!(HrError::invalid("amount", "must be positive").status_code(), 422);
        assert_eq!(HrError::conflict("taken").error_code(), "conflict");
        assert_eq!(
            HrError::ExternalService {
                service: "finance".into(),
                message: "down".into()
            }
            .status_code(),
            502
        );
    }
}
