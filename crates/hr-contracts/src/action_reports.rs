//! Action report contract

use hr_core::error::ValidationErrors;
use hr_models::NewActionReport;

use crate::base::{validate_optional_text, validate_text, Contract, ValidationResult};

pub struct ActionReportContract;

impl Contract<NewActionReport> for ActionReportContract {
    fn validate(&self, entity: &NewActionReport) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_text("actionTaken", &entity.action_taken, 2000, &mut errors);
        validate_optional_text("remarks", entity.remarks.as_deref(), 5000, &mut errors);
        validate_optional_text(
            "violationReference",
            entity.violation_reference.as_deref(),
            100,
            &mut errors,
        );
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_required() {
        let input = NewActionReport {
            employee_id: 8,
            complaint_id: Some(2),
            reported_by: 1,
            action_taken: "  ".into(),
            remarks: None,
            violation_reference: None,
        };
        assert!(ActionReportContract.validate(&input).unwrap_err().has_error("actionTaken"));
    }
}
