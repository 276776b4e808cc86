//! Grievance contracts

use hr_core::error::ValidationErrors;
use hr_models::{ComplaintStatus, ComplaintUpdate, NewComplaint};

use crate::base::{validate_optional_text, validate_text, Contract, ValidationResult};

pub struct ComplaintContract;

impl Contract<NewComplaint> for ComplaintContract {
    fn validate(&self, entity: &NewComplaint) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_text("subject", &entity.subject, 200, &mut errors);
        validate_text("description", &entity.description, 5000, &mut errors);
        validate_text("category", &entity.category, 100, &mut errors);
        validate_optional_text("attachmentUrl", entity.attachment_url.as_deref(), 2048, &mut errors);
        errors.into_result()
    }
}

/// Validates an admin status change against the current status
pub struct ComplaintStatusContract {
    current: ComplaintStatus,
}

impl ComplaintStatusContract {
    pub fn new(current: ComplaintStatus) -> Self {
        Self { current }
    }
}

impl Contract<ComplaintUpdate> for ComplaintStatusContract {
    fn validate(&self, entity: &ComplaintUpdate) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if !self.current.can_transition_to(entity.status) {
            errors.add(
                "status",
                format!("cannot change from {} to {}", self.current, entity.status),
            );
        }
        validate_optional_text("adminResponse", entity.admin_response.as_deref(), 5000, &mut errors);

        errors.into_result()
    }
}
