//! Improvement suggestions

use std::sync::Arc;

use hr_auth::CurrentUser;
use hr_contracts::{validate_optional_text, SuggestionContract};
use hr_core::error::ValidationErrors;
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_core::HrResult;
use hr_db::{Repository, SuggestionStore};
use hr_models::{NewSuggestion, Suggestion, SuggestionUpdate};
use tracing::{info, instrument};

use crate::base::{found, validate};

pub struct SuggestionService {
    suggestions: Arc<dyn SuggestionStore>,
}

impl SuggestionService {
    pub fn new(suggestions: Arc<dyn SuggestionStore>) -> Self {
        Self { suggestions }
    }

    #[instrument(skip(self, input), fields(employee_id = current.id))]
    pub async fn submit(&self, current: &CurrentUser, mut input: NewSuggestion) -> HrResult<Suggestion> {
        input.employee_id = current.id;
        validate(&SuggestionContract, &input)?;

        let suggestion = self.suggestions.create(input).await?;
        info!(suggestion_id = suggestion.id, "Suggestion submitted");
        Ok(suggestion)
    }

    pub async fn list(
        &self,
        current: &CurrentUser,
        params: PaginationParams,
    ) -> HrResult<Page<Suggestion>> {
        let params = params.normalized();
        if current.is_admin() {
            Ok(self.suggestions.find_all(params).await?)
        } else {
            Ok(self.suggestions.find_by_employee(current.id, params).await?)
        }
    }

    pub async fn get(&self, current: &CurrentUser, id: Id) -> HrResult<Suggestion> {
        let suggestion = self.suggestions.find_by_id(id).await?;
        let suggestion = found("suggestion", id, suggestion)?;
        current.require_access(&suggestion)?;
        Ok(suggestion)
    }

    #[instrument(skip(self, update), fields(admin_id = current.id))]
    pub async fn review(
        &self,
        current: &CurrentUser,
        id: Id,
        update: SuggestionUpdate,
    ) -> HrResult<Suggestion> {
        current.require_admin()?;

        let mut errors = ValidationErrors::new();
        validate_optional_text("adminFeedback", update.admin_feedback.as_deref(), 5000, &mut errors);
        errors.into_result()?;

        let reviewed = self.suggestions.review(id, update).await?;
        info!(suggestion_id = id, status = %reviewed.status, "Suggestion reviewed");
        Ok(reviewed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_db::MemorySuggestionStore;
    use hr_models::SuggestionStatus;

    fn service() -> SuggestionService {
        SuggestionService::new(Arc::new(MemorySuggestionStore::new()))
    }

    fn suggestion() -> NewSuggestion {
        NewSuggestion {
            employee_id: 0,
            title: "Second coffee machine".to_string(),
            description: "The canteen queue eats into short breaks".to_string(),
            category: "Facilities".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submitted_suggestion_is_pending() {
        let service = service();
        let author = CurrentUser::employee(8, "e8@example.com");

        let created = service.submit(&author, suggestion()).await.unwrap();
        let fetched = service.get(&author, created.id).await.unwrap();

        assert_eq!(fetched.status, SuggestionStatus::Pending);
        assert_eq!(fetched.employee_id, 8);
        assert_eq!(fetched.title, "Second coffee machine");
    }

    #[tokio::test]
    async fn test_review_is_admin_only() {
        let service = service();
        let author = CurrentUser::employee(8, "e8@example.com");
        let admin = CurrentUser::admin(1, "admin@example.com");
        let created = service.submit(&author, suggestion()).await.unwrap();

        let update = SuggestionUpdate {
            status: SuggestionStatus::Implemented,
            admin_feedback: Some("Installed on Monday".to_string()),
        };
        assert!(service.review(&author, created.id, update.clone()).await.is_err());

        let reviewed = service.review(&admin, created.id, update).await.unwrap();
        assert_eq!(reviewed.status, SuggestionStatus::Implemented);
        assert_eq!(reviewed.admin_feedback.as_deref(), Some("Installed on Monday"));
    }

    #[tokio::test]
    async fn test_list_scoping() {
        let service = service();
        service
            .submit(&CurrentUser::employee(8, "e8@example.com"), suggestion())
            .await
            .unwrap();
        service
            .submit(&CurrentUser::employee(9, "e9@example.com"), suggestion())
            .await
            .unwrap();

        let own = service
            .list(&CurrentUser::employee(8, "e8@example.com"), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(own.total, 1);

        let all = service
            .list(&CurrentUser::admin(1, "admin@example.com"), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);
    }
}
