//! # hr-models
//!
//! Domain models for the HR portal.
//!
//! Every entity is a flat record. Status columns are closed enums that
//! serialize to the exact labels the portal frontend displays.

pub use hr_core::traits::{Id, Identifiable, Owned, Timestamped};

pub mod action_report;
pub mod announcement;
pub mod budget_request;
pub mod complaint;
pub mod employee;
pub mod message;
pub mod suggestion;
pub mod user;

pub use action_report::{ActionReport, NewActionReport};
pub use announcement::{Announcement, AnnouncementComment, NewAnnouncement, NewComment};
pub use budget_request::{BudgetDecision, BudgetRequest, BudgetRequestUpdate, BudgetStatus, NewBudgetRequest};
pub use complaint::{Complaint, ComplaintStatus, ComplaintUpdate, NewComplaint};
pub use employee::{Employee, EmployeeHours, NewEmployee};
pub use message::{Message, NewMessage};
pub use suggestion::{NewSuggestion, Suggestion, SuggestionStatus, SuggestionUpdate};
pub use user::{NewUser, ProfileUpdate, Role, User, UserUpdate};

/// Error returned when a stored enum label is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
