//! # hr-db
//!
//! Database layer for the HR portal.
//!
//! - Connection pool management
//! - Idempotent schema bootstrap
//! - One store trait per collection, each with a PostgreSQL
//!   implementation and an in-memory one used by tests
//!
//! ## Example
//!
//! ```ignore
//! use hr_db::{Database, PgComplaintStore, ComplaintStore};
//!
//! let db = Database::connect(&config.database).await?;
//! hr_db::schema::ensure_schema(db.pool()).await?;
//!
//! let complaints = PgComplaintStore::new(db.pool().clone());
//! let complaint = complaints.find_by_id(1).await?;
//! ```

pub mod action_reports;
pub mod announcements;
pub mod budget_requests;
pub mod complaints;
pub mod employees;
mod memory;
pub mod messages;
pub mod pool;
pub mod repository;
pub mod schema;
pub mod suggestions;
pub mod users;

pub use action_reports::{ActionReportStore, MemoryActionReportStore, PgActionReportStore};
pub use announcements::{AnnouncementStore, MemoryAnnouncementStore, PgAnnouncementStore};
pub use budget_requests::{BudgetRequestStore, MemoryBudgetRequestStore, PgBudgetRequestStore};
pub use complaints::{ComplaintStore, MemoryComplaintStore, PgComplaintStore};
pub use employees::{EmployeeStore, MemoryEmployeeStore, PgEmployeeStore, UpsertSummary};
pub use messages::{MemoryMessageStore, MessageStore, PgMessageStore};
pub use pool::{Database, PoolStats};
pub use repository::{Repository, RepositoryError, RepositoryResult};
pub use suggestions::{MemorySuggestionStore, PgSuggestionStore, SuggestionStore};
pub use users::{MemoryUserStore, PgUserStore, UserStore};
