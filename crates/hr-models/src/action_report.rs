//! Disciplinary / corrective action reports
//!
//! Table: action_reports

use chrono::{DateTime, Utc};
use hr_core::traits::{Id, Identifiable, Owned, Timestamped};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionReport {
    pub id: Id,
    /// Employee the action concerns
    pub employee_id: Id,
    /// Grievance that led to the action, if any
    pub complaint_id: Option<Id>,
    pub reported_by: Id,
    pub action_taken: String,
    pub remarks: Option<String>,
    /// Violation id in HR3
    pub violation_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for ActionReport {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for ActionReport {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Owned for ActionReport {
    fn owner_id(&self) -> Id {
        self.employee_id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActionReport {
    pub employee_id: Id,
    pub complaint_id: Option<Id>,
    #[serde(skip)]
    pub reported_by: Id,
    pub action_taken: String,
    pub remarks: Option<String>,
    pub violation_reference: Option<String>,
}
