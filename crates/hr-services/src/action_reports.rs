//! Disciplinary action reports

use std::sync::Arc;

use hr_auth::CurrentUser;
use hr_contracts::ActionReportContract;
use hr_core::pagination::{Page, PaginationParams};
use hr_core::{HrError, HrResult};
use hr_db::{ActionReportStore, ComplaintStore, Repository, UserStore};
use hr_models::{ActionReport, NewActionReport};
use tracing::{info, instrument};

use crate::base::validate;

pub struct ActionReportService {
    reports: Arc<dyn ActionReportStore>,
    users: Arc<dyn UserStore>,
    complaints: Arc<dyn ComplaintStore>,
}

impl ActionReportService {
    pub fn new(
        reports: Arc<dyn ActionReportStore>,
        users: Arc<dyn UserStore>,
        complaints: Arc<dyn ComplaintStore>,
    ) -> Self {
        Self {
            reports,
            users,
            complaints,
        }
    }

    #[instrument(skip(self, input), fields(reported_by = current.id))]
    pub async fn create(
        &self,
        current: &CurrentUser,
        mut input: NewActionReport,
    ) -> HrResult<ActionReport> {
        current.require_admin()?;
        input.reported_by = current.id;
        validate(&ActionReportContract, &input)?;

        if !self.users.exists(input.employee_id).await? {
            return Err(HrError::not_found("user", input.employee_id));
        }
        if let Some(complaint_id) = input.complaint_id {
            if !self.complaints.exists(complaint_id).await? {
                return Err(HrError::not_found("complaint", complaint_id));
            }
        }

        let report = self.reports.create(input).await?;
        info!(
            action_report_id = report.id,
            employee_id = report.employee_id,
            "Action report filed"
        );
        Ok(report)
    }

    /// Admins see all reports, employees the ones filed about them
    pub async fn list(
        &self,
        current: &CurrentUser,
        params: PaginationParams,
    ) -> HrResult<Page<ActionReport>> {
        let params = params.normalized();
        if current.is_admin() {
            Ok(self.reports.find_all(params).await?)
        } else {
            Ok(self.reports.find_by_employee(current.id, params).await?)
        }
    }
}
