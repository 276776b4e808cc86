//! Suggestion contract

use hr_core::error::ValidationErrors;
use hr_models::NewSuggestion;

use crate::base::{validate_text, Contract, ValidationResult};

pub struct SuggestionContract;

impl Contract<NewSuggestion> for SuggestionContract {
    fn validate(&self, entity: &NewSuggestion) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_text("title", &entity.title, 200, &mut errors);
        validate_text("description", &entity.description, 5000, &mut errors);
        validate_text("category", &entity.category, 100, &mut errors);
        errors.into_result()
    }
}
