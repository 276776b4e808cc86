//! # hr-services
//!
//! Business operations for the HR portal.
//!
//! One service per module. Services take the caller as a [`CurrentUser`],
//! enforce ownership and admin rules, validate input through the
//! contracts, and talk to storage only through the `hr-db` store traits.
//!
//! [`CurrentUser`]: hr_auth::CurrentUser

pub mod action_reports;
pub mod announcements;
pub mod auth;
pub mod base;
pub mod budget;
pub mod grievances;
pub mod integration;
pub mod messages;
pub mod scoring;
pub mod suggestions;

use std::sync::Arc;

use hr_attachments::{Storage, UploadService};
use hr_auth::{JwtService, TwoFactorStore};
use hr_core::config::AppConfig;
use hr_db::{
    ActionReportStore, AnnouncementStore, BudgetRequestStore, ComplaintStore, EmployeeStore,
    MemoryActionReportStore, MemoryAnnouncementStore, MemoryBudgetRequestStore,
    MemoryComplaintStore, MemoryEmployeeStore, MemoryMessageStore, MemorySuggestionStore,
    MemoryUserStore, MessageStore, SuggestionStore, UserStore,
};
use hr_integrations::{FinanceGateway, HrModules};
use hr_notifications::EmailSender;

pub use action_reports::ActionReportService;
pub use announcements::AnnouncementService;
pub use auth::{
    AuthService, AuthSession, AuthSettings, LoginOutcome, LoginRequest, RegisterRequest,
};
pub use budget::BudgetService;
pub use grievances::GrievanceService;
pub use integration::{IntegrationService, SyncReport};
pub use messages::MessageService;
pub use scoring::{RankedEmployee, ScoreWeights};
pub use suggestions::SuggestionService;

/// Every store the services need
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub complaints: Arc<dyn ComplaintStore>,
    pub suggestions: Arc<dyn SuggestionStore>,
    pub budget_requests: Arc<dyn BudgetRequestStore>,
    pub messages: Arc<dyn MessageStore>,
    pub announcements: Arc<dyn AnnouncementStore>,
    pub action_reports: Arc<dyn ActionReportStore>,
    pub employees: Arc<dyn EmployeeStore>,
}

impl Stores {
    /// In-memory stores, for tests and local experiments
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            complaints: Arc::new(MemoryComplaintStore::new()),
            suggestions: Arc::new(MemorySuggestionStore::new()),
            budget_requests: Arc::new(MemoryBudgetRequestStore::new()),
            messages: Arc::new(MemoryMessageStore::new()),
            announcements: Arc::new(MemoryAnnouncementStore::new()),
            action_reports: Arc::new(MemoryActionReportStore::new()),
            employees: Arc::new(MemoryEmployeeStore::new()),
        }
    }
}

/// Outbound collaborators: mail, file storage and the sibling services
#[derive(Clone)]
pub struct Collaborators {
    pub jwt: Arc<JwtService>,
    pub codes: Arc<dyn TwoFactorStore>,
    pub mailer: Arc<dyn EmailSender>,
    pub storage: Arc<dyn Storage>,
    pub modules: Arc<dyn HrModules>,
    pub finance: Arc<dyn FinanceGateway>,
}

/// All services, shared by the HTTP layer
#[derive(Clone)]
pub struct HrServices {
    pub auth: Arc<AuthService>,
    pub grievances: Arc<GrievanceService>,
    pub suggestions: Arc<SuggestionService>,
    pub budget: Arc<BudgetService>,
    pub messages: Arc<MessageService>,
    pub announcements: Arc<AnnouncementService>,
    pub action_reports: Arc<ActionReportService>,
    pub integration: Arc<IntegrationService>,
    pub uploads: Arc<UploadService>,
}

impl HrServices {
    pub fn new(config: &AppConfig, stores: Stores, collaborators: Collaborators) -> Self {
        let settings = AuthSettings::new(&config.auth, config.two_factor.enabled, &config.email);

        Self {
            auth: Arc::new(AuthService::new(
                stores.users.clone(),
                collaborators.jwt,
                collaborators.codes,
                collaborators.mailer,
                settings,
            )),
            grievances: Arc::new(GrievanceService::new(stores.complaints.clone())),
            suggestions: Arc::new(SuggestionService::new(stores.suggestions)),
            budget: Arc::new(BudgetService::new(
                stores.budget_requests,
                collaborators.finance,
            )),
            messages: Arc::new(MessageService::new(stores.messages, stores.users.clone())),
            announcements: Arc::new(AnnouncementService::new(stores.announcements)),
            action_reports: Arc::new(ActionReportService::new(
                stores.action_reports,
                stores.users,
                stores.complaints,
            )),
            integration: Arc::new(IntegrationService::new(
                collaborators.modules,
                stores.employees,
                ScoreWeights::from(config.scoring),
            )),
            uploads: Arc::new(UploadService::new(
                collaborators.storage,
                config.storage.max_upload_bytes,
            )),
        }
    }
}
