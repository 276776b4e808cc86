//! Finance gateway client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::BudgetRequest;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ServiceClient;
use crate::endpoints::{join, ServiceEndpoints};
use crate::error::{IntegrationError, IntegrationResult};

/// Acknowledgement returned by the finance gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReceipt {
    #[serde(alias = "reference_id", alias = "referenceId", alias = "id")]
    pub reference: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "received_at")]
    pub received_at: Option<DateTime<Utc>>,
}

/// What the gateway receives for a budget request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FinanceSubmission<'a> {
    source: &'static str,
    portal_request_id: Id,
    department: &'a str,
    title: &'a str,
    amount: f64,
    justification: &'a str,
    document_url: &'a str,
    requested_at: DateTime<Utc>,
}

impl<'a> From<&'a BudgetRequest> for FinanceSubmission<'a> {
    fn from(request: &'a BudgetRequest) -> Self {
        Self {
            source: crate::client::SERVICE_NAME,
            portal_request_id: request.id,
            department: &request.department,
            title: &request.title,
            amount: request.amount,
            justification: &request.justification,
            document_url: &request.document_url,
            requested_at: request.created_at,
        }
    }
}

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait FinanceGateway: Send + Sync {
    async fn submit_budget_request(&self, request: &BudgetRequest)
        -> IntegrationResult<FinanceReceipt>;
}

pub struct HttpFinanceGateway {
    client: ServiceClient,
    endpoints: ServiceEndpoints,
}

impl HttpFinanceGateway {
    pub fn new(client: ServiceClient, endpoints: ServiceEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl FinanceGateway for HttpFinanceGateway {
    async fn submit_budget_request(
        &self,
        request: &BudgetRequest,
    ) -> IntegrationResult<FinanceReceipt> {
        let url = join("finance", &self.endpoints.finance, "api/budget-requests")?;
        let receipt: FinanceReceipt = self
            .client
            .post_json("finance", url, &FinanceSubmission::from(request))
            .await?;

        if receipt.reference.trim().is_empty() {
            return Err(IntegrationError::Decode {
                service: "finance",
                message: "receipt without a reference".to_string(),
            });
        }

        info!(
            budget_request_id = request.id,
            reference = %receipt.reference,
            "Budget request submitted to finance"
        );
        Ok(receipt)
    }
}
