//! Budget request contract

use hr_core::error::ValidationErrors;
use hr_models::NewBudgetRequest;
use regex::Regex;
use std::sync::LazyLock;

use crate::base::{validate_text, Contract, ValidationResult};

/// Supporting documents must be links to PDF files
pub static PDF_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\S+\.pdf$").unwrap());

pub struct BudgetRequestContract;

impl BudgetRequestContract {
    fn validate_amount(amount: f64, errors: &mut ValidationErrors) {
        if !amount.is_finite() {
            errors.add("amount", "is not a number");
        } else if amount <= 0.0 {
            errors.add("amount", "must be greater than 0");
        }
    }

    fn validate_document(url: &str, errors: &mut ValidationErrors) {
        if url.trim().is_empty() {
            errors.add("documentUrl", "can't be blank");
        } else if !PDF_URL_PATTERN.is_match(url) {
            errors.add("documentUrl", "must be a link to a PDF file");
        }
    }
}

impl Contract<NewBudgetRequest> for BudgetRequestContract {
    fn validate(&self, entity: &NewBudgetRequest) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_text("department", &entity.department, 100, &mut errors);
        validate_text("title", &entity.title, 200, &mut errors);
        validate_text("justification", &entity.justification, 5000, &mut errors);
        Self::validate_amount(entity.amount, &mut errors);
        Self::validate_document(&entity.document_url, &mut errors);
        errors.into_result()
    }
}
