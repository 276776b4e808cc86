//! Grievance (complaint) model
//!
//! Table: complaints

use chrono::{DateTime, Utc};
use hr_core::traits::{Id, Identifiable, Owned, Timestamped};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// Grievance workflow status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum ComplaintStatus {
    #[default]
    Pending,
    #[serde(rename = "In-Review")]
    InReview,
    Resolved,
    Escalated,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InReview,
        ComplaintStatus::Resolved,
        ComplaintStatus::Escalated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InReview => "In-Review",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Escalated => "Escalated",
        }
    }

    /// A resolved grievance can only be reopened by escalating it
    pub fn can_transition_to(&self, next: ComplaintStatus) -> bool {
        match self {
            ComplaintStatus::Resolved => next == ComplaintStatus::Escalated,
            _ => *self != next,
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("complaint status", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Id,
    /// Author's user id; hidden from other employees when `anonymous`
    pub employee_id: Option<Id>,
    pub subject: String,
    pub description: String,
    pub category: String,
    pub anonymous: bool,
    pub attachment_url: Option<String>,
    pub status: ComplaintStatus,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Copy safe to show to `viewer_id`
    pub fn redacted_for(mut self, viewer_id: Id, viewer_is_admin: bool) -> Self {
        if self.anonymous && !viewer_is_admin && self.employee_id != Some(viewer_id) {
            self.employee_id = None;
        }
        self
    }
}

impl Identifiable for Complaint {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Complaint {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Owned for Complaint {
    fn owner_id(&self) -> Id {
        self.employee_id.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    #[serde(skip)]
    pub employee_id: Id,
    pub subject: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub anonymous: bool,
    pub attachment_url: Option<String>,
}

/// Admin status change
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintUpdate {
    pub status: ComplaintStatus,
    pub admin_response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::InReview).unwrap(),
            "\"In-Review\""
        );
        assert_eq!("In-Review".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::InReview);
        assert!("InReview".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn test_transitions() {
        use ComplaintStatus::*;
        assert!(Pending.can_transition_to(InReview));
        assert!(InReview.can_transition_to(Resolved));
        assert!(Pending.can_transition_to(Escalated));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Resolved.can_transition_to(Pending));
        assert!(Resolved.can_transition_to(Escalated));
    }

    #[test]
    fn test_anonymous_redaction() {
        let now = Utc::now();
        let complaint = Complaint {
            id: 1,
            employee_id: Some(10),
            subject: "Unsafe ladder".into(),
            description: "Rung is cracked".into(),
            category: "Safety".into(),
            anonymous: true,
            attachment_url: None,
            status: ComplaintStatus::Pending,
            admin_response: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(complaint.clone().redacted_for(10, false).employee_id, Some(10));
        assert_eq!(complaint.clone().redacted_for(99, true).employee_id, Some(10));
        assert_eq!(complaint.redacted_for(99, false).employee_id, None);
    }
}
