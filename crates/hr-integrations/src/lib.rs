//! # hr-integrations
//!
//! Outbound calls to the other HR modules and the finance gateway:
//!
//! - HR1: time tracking, mirrored locally as attendance entries
//! - HR2: training records
//! - HR3: violations
//! - Finance: budget request submission
//!
//! Every call carries a short lived service JWT.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod finance;
pub mod hr_modules;

pub use client::ServiceClient;
pub use endpoints::ServiceEndpoints;
pub use error::{IntegrationError, IntegrationResult};
pub use finance::{FinanceGateway, FinanceReceipt, HttpFinanceGateway};
pub use hr_modules::{AttendanceRecord, HrModules, HttpHrModules, TrainingRecord, Violation};

#[cfg(any(test, feature = "mocks"))]
pub use finance::MockFinanceGateway;
#[cfg(any(test, feature = "mocks"))]
pub use hr_modules::MockHrModules;
