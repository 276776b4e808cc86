//! Department budget requests

use std::sync::Arc;

use hr_auth::CurrentUser;
use hr_contracts::{validate_optional_text, BudgetRequestContract};
use hr_core::error::ValidationErrors;
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_core::{HrError, HrResult};
use hr_db::{BudgetRequestStore, Repository};
use hr_integrations::FinanceGateway;
use hr_models::{BudgetDecision, BudgetRequest, BudgetRequestUpdate, BudgetStatus, NewBudgetRequest};
use tracing::{info, instrument, warn};

use crate::base::{found, validate};

pub struct BudgetService {
    requests: Arc<dyn BudgetRequestStore>,
    finance: Arc<dyn FinanceGateway>,
}

impl BudgetService {
    pub fn new(requests: Arc<dyn BudgetRequestStore>, finance: Arc<dyn FinanceGateway>) -> Self {
        Self { requests, finance }
    }

    async fn load(&self, id: Id) -> HrResult<BudgetRequest> {
        let request = self.requests.find_by_id(id).await?;
        found("budget request", id, request)
    }

    #[instrument(skip(self, input), fields(requested_by = current.id))]
    pub async fn create(
        &self,
        current: &CurrentUser,
        mut input: NewBudgetRequest,
    ) -> HrResult<BudgetRequest> {
        input.requested_by = current.id;
        input.document_url = input.document_url.trim().to_string();
        validate(&BudgetRequestContract, &input)?;

        let request = self.requests.create(input).await?;
        info!(budget_request_id = request.id, amount = request.amount, "Budget request created");
        Ok(request)
    }

    pub async fn list(
        &self,
        current: &CurrentUser,
        params: PaginationParams,
    ) -> HrResult<Page<BudgetRequest>> {
        let params = params.normalized();
        if current.is_admin() {
            Ok(self.requests.find_all(params).await?)
        } else {
            Ok(self.requests.find_by_requester(current.id, params).await?)
        }
    }

    pub async fn get(&self, current: &CurrentUser, id: Id) -> HrResult<BudgetRequest> {
        let request = self.load(id).await?;
        current.require_access(&request)?;
        Ok(request)
    }

    /// Forward a pending request to the finance gateway
    #[instrument(skip(self), fields(user_id = current.id))]
    pub async fn submit_to_finance(&self, current: &CurrentUser, id: Id) -> HrResult<BudgetRequest> {
        let request = self.load(id).await?;
        current.require_access(&request)?;

        if request.status != BudgetStatus::Pending {
            return Err(HrError::conflict(format!(
                "Only pending requests can be submitted, this one is {}",
                request.status
            )));
        }

        let receipt = self.finance.submit_budget_request(&request).await.map_err(|e| {
            warn!(budget_request_id = id, error = %e, "Finance submission failed");
            HrError::from(e)
        })?;

        let updated = self
            .requests
            .update(
                id,
                BudgetRequestUpdate {
                    status: Some(BudgetStatus::Submitted),
                    finance_reference: Some(receipt.reference),
                    reviewer_note: None,
                },
            )
            .await?;
        info!(budget_request_id = id, "Budget request submitted");
        Ok(updated)
    }

    /// Approve or reject a request that has not been decided yet
    #[instrument(skip(self, decision), fields(admin_id = current.id))]
    pub async fn decide(
        &self,
        current: &CurrentUser,
        id: Id,
        decision: BudgetDecision,
    ) -> HrResult<BudgetRequest> {
        current.require_admin()?;

        let mut errors = ValidationErrors::new();
        if !decision.status.is_final() {
            errors.add("status", "must be Approved or Rejected");
        }
        validate_optional_text("note", decision.note.as_deref(), 2000, &mut errors);
        errors.into_result()?;

        let request = self.load(id).await?;
        if request.status.is_final() {
            return Err(HrError::conflict(format!(
                "Budget request {} is already {}",
                id, request.status
            )));
        }

        let updated = self
            .requests
            .update(
                id,
                BudgetRequestUpdate {
                    status: Some(decision.status),
                    finance_reference: None,
                    reviewer_note: decision.note,
                },
            )
            .await?;
        info!(budget_request_id = id, status = %updated.status, "Budget request decided");
        Ok(updated)
    }
}
