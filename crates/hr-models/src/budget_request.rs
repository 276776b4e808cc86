//! Department budget request model
//!
//! Table: budget_requests

use chrono::{DateTime, Utc};
use hr_core::traits::{Id, Identifiable, Owned, Timestamped};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum BudgetStatus {
    #[default]
    Pending,
    /// Forwarded to the finance gateway
    Submitted,
    Approved,
    Rejected,
}

impl BudgetStatus {
    pub const ALL: [BudgetStatus; 4] = [
        BudgetStatus::Pending,
        BudgetStatus::Submitted,
        BudgetStatus::Approved,
        BudgetStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Pending => "Pending",
            BudgetStatus::Submitted => "Submitted",
            BudgetStatus::Approved => "Approved",
            BudgetStatus::Rejected => "Rejected",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, BudgetStatus::Approved | BudgetStatus::Rejected)
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BudgetStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("budget status", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRequest {
    pub id: Id,
    pub requested_by: Id,
    pub department: String,
    pub title: String,
    pub amount: f64,
    pub justification: String,
    /// Supporting PDF
    pub document_url: String,
    pub status: BudgetStatus,
    /// Reference assigned by the finance gateway on submission
    pub finance_reference: Option<String>,
    pub reviewer_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for BudgetRequest {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for BudgetRequest {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Owned for BudgetRequest {
    fn owner_id(&self) -> Id {
        self.requested_by
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudgetRequest {
    #[serde(skip)]
    pub requested_by: Id,
    pub department: String,
    pub title: String,
    pub amount: f64,
    pub justification: String,
    pub document_url: String,
}

/// Store-level partial update
#[derive(Debug, Clone, Default)]
pub struct BudgetRequestUpdate {
    pub status: Option<BudgetStatus>,
    pub finance_reference: Option<String>,
    pub reviewer_note: Option<String>,
}

/// Admin decision body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDecision {
    pub status: BudgetStatus,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_states() {
        assert!(BudgetStatus::Approved.is_final());
        assert!(BudgetStatus::Rejected.is_final());
        assert!(!BudgetStatus::Submitted.is_final());
    }

    #[test]
    fn test_deserialize_new_request() {
        let input: NewBudgetRequest = serde_json::from_str(
            r#"{"department":"Maintenance","title":"Forklift","amount":1250.5,
                "justification":"Replace unit 3","documentUrl":"https://files.example.com/q.pdf"}"#,
        )
        .unwrap();
        assert_eq!(input.amount, 1250.5);
        assert_eq!(input.document_url, "https://files.example.com/q.pdf");
    }
}
