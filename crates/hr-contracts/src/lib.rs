//! # hr-contracts
//!
//! Contract validation for the HR portal.
//!
//! Contracts validate input before create/update operations. They check
//! shape only; ownership and role checks live in the services.

pub mod action_reports;
pub mod announcements;
pub mod base;
pub mod budget_requests;
pub mod complaints;
pub mod messages;
pub mod suggestions;
pub mod users;

pub use action_reports::ActionReportContract;
pub use announcements::{AnnouncementContract, CommentContract};
pub use base::*;
pub use budget_requests::{BudgetRequestContract, PDF_URL_PATTERN};
pub use complaints::{ComplaintContract, ComplaintStatusContract};
pub use messages::MessageContract;
pub use suggestions::SuggestionContract;
pub use users::{Registration, RegistrationContract, SYSTEM_CODE_PREFIX};
