//! Employee grievances (complaints)

use std::sync::Arc;

use hr_auth::CurrentUser;
use hr_contracts::{ComplaintContract, ComplaintStatusContract};
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_core::{HrError, HrResult};
use hr_db::{ComplaintStore, Repository};
use hr_models::{Complaint, ComplaintStatus, ComplaintUpdate, NewComplaint};
use tracing::{info, instrument};

use crate::base::{found, validate};

pub struct GrievanceService {
    complaints: Arc<dyn ComplaintStore>,
}

impl GrievanceService {
    pub fn new(complaints: Arc<dyn ComplaintStore>) -> Self {
        Self { complaints }
    }

    async fn load(&self, id: Id) -> HrResult<Complaint> {
        let complaint = self.complaints.find_by_id(id).await?;
        found("complaint", id, complaint)
    }

    #[instrument(skip(self, input), fields(employee_id = current.id))]
    pub async fn submit(&self, current: &CurrentUser, mut input: NewComplaint) -> HrResult<Complaint> {
        input.employee_id = current.id;
        validate(&ComplaintContract, &input)?;

        let complaint = self.complaints.create(input).await?;
        info!(complaint_id = complaint.id, anonymous = complaint.anonymous, "Complaint submitted");
        Ok(complaint)
    }

    /// Admins see every complaint, employees their own
    pub async fn list(
        &self,
        current: &CurrentUser,
        params: PaginationParams,
    ) -> HrResult<Page<Complaint>> {
        let params = params.normalized();
        let page = if current.is_admin() {
            self.complaints.find_all(params).await?
        } else {
            self.complaints.find_by_employee(current.id, params).await?
        };
        Ok(page.map(|c| c.redacted_for(current.id, current.is_admin())))
    }

    pub async fn get(&self, current: &CurrentUser, id: Id) -> HrResult<Complaint> {
        let complaint = self.load(id).await?;
        current.require_access(&complaint)?;
        Ok(complaint.redacted_for(current.id, current.is_admin()))
    }

    #[instrument(skip(self, update), fields(admin_id = current.id))]
    pub async fn update_status(
        &self,
        current: &CurrentUser,
        id: Id,
        update: ComplaintUpdate,
    ) -> HrResult<Complaint> {
        current.require_admin()?;
        let complaint = self.load(id).await?;

        validate(&ComplaintStatusContract::new(complaint.status), &update)?;

        let from = complaint.status;
        let updated = self.complaints.update_status(id, update).await?;
        info!(complaint_id = id, %from, to = %updated.status, "Complaint status changed");
        Ok(updated)
    }

    /// Admins may delete any complaint; authors only while it is pending
    #[instrument(skip(self), fields(user_id = current.id))]
    pub async fn delete(&self, current: &CurrentUser, id: Id) -> HrResult<()> {
        let complaint = self.load(id).await?;

        if !current.is_admin() {
            current.require_access(&complaint)?;
            if complaint.status != ComplaintStatus::Pending {
                return Err(HrError::forbidden(
                    "Only pending complaints can be withdrawn",
                ));
            }
        }

        self.complaints.delete(id).await?;
        info!(complaint_id = id, "Complaint deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_db::MemoryComplaintStore;

    fn service() -> GrievanceService {
        GrievanceService::new(Arc::new(MemoryComplaintStore::new()))
    }

    fn complaint(anonymous: bool) -> NewComplaint {
        NewComplaint {
            employee_id: 0,
            subject: "Unsafe scaffolding".to_string(),
            description: "Bay 4 scaffolding has a loose rail".to_string(),
            category: "Safety".to_string(),
            anonymous,
            attachment_url: None,
        }
    }

    fn status(status: ComplaintStatus) -> ComplaintUpdate {
        ComplaintUpdate {
            status,
            admin_response: None,
        }
    }

    #[tokio::test]
    async fn test_submit_sets_author_and_pending() {
        let service = service();
        let author = CurrentUser::employee(5, "e5@example.com");

        let created = service.submit(&author, complaint(false)).await.unwrap();
        assert_eq!(created.employee_id, Some(5));
        assert_eq!(created.status, ComplaintStatus::Pending);
        assert_eq!(service.get(&author, created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_submit_validates() {
        let service = service();
        let mut input = complaint(false);
        input.subject = String::new();

        let err = service
            .submit(&CurrentUser::employee(5, "e5@example.com"), input)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn test_visibility() {
        let service = service();
        let author = CurrentUser::employee(5, "e5@example.com");
        let other = CurrentUser::employee(6, "e6@example.com");
        let admin = CurrentUser::admin(1, "admin@example.com");

        let created = service.submit(&author, complaint(true)).await.unwrap();
        service.submit(&other, complaint(false)).await.unwrap();

        assert_eq!(service.list(&author, PaginationParams::default()).await.unwrap().total, 1);
        assert_eq!(service.list(&admin, PaginationParams::default()).await.unwrap().total, 2);
        assert_eq!(
            service.get(&other, created.id).await.unwrap_err().status_code(),
            403
        );

        // admins see who filed an anonymous complaint
        let seen_by_admin = service.get(&admin, created.id).await.unwrap();
        assert_eq!(seen_by_admin.employee_id, Some(5));
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let service = service();
        let author = CurrentUser::employee(5, "e5@example.com");
        let admin = CurrentUser::admin(1, "admin@example.com");
        let created = service.submit(&author, complaint(false)).await.unwrap();

        assert_eq!(
            service
                .update_status(&author, created.id, status(ComplaintStatus::Resolved))
                .await
                .unwrap_err()
                .status_code(),
            403
        );

        let resolved = service
            .update_status(
                &admin,
                created.id,
                ComplaintUpdate {
                    status: ComplaintStatus::Resolved,
                    admin_response: Some("Rail replaced".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(resolved.status, ComplaintStatus::Resolved);
        assert_eq!(resolved.admin_response.as_deref(), Some("Rail replaced"));

        let reopened = service
            .update_status(&admin, created.id, status(ComplaintStatus::Pending))
            .await;
        assert_eq!(reopened.unwrap_err().status_code(), 422);

        let escalated = service
            .update_status(&admin, created.id, status(ComplaintStatus::Escalated))
            .await
            .unwrap();
        assert_eq!(escalated.status, ComplaintStatus::Escalated);
        assert_eq!(escalated.admin_response.as_deref(), Some("Rail replaced"));
    }

    #[tokio::test]
    async fn test_long_admin_response_reported_once() {
        let service = service();
        let author = CurrentUser::employee(5, "e5@example.com");
        let admin = CurrentUser::admin(1, "admin@example.com");
        let created = service.submit(&author, complaint(false)).await.unwrap();

        let err = service
            .update_status(
                &admin,
                created.id,
                ComplaintUpdate {
                    status: ComplaintStatus::InReview,
                    admin_response: Some("x".repeat(5001)),
                },
            )
            .await
            .unwrap_err();

        match err {
            HrError::Validation(errors) => {
                assert_eq!(errors.get("adminResponse").map(Vec::len), Some(1));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let service = service();
        let author = CurrentUser::employee(5, "e5@example.com");
        let admin = CurrentUser::admin(1, "admin@example.com");

        let pending = service.submit(&author, complaint(false)).await.unwrap();
        service.delete(&author, pending.id).await.unwrap();
        assert_eq!(
            service.get(&author, pending.id).await.unwrap_err().status_code(),
            404
        );

        let reviewed = service.submit(&author, complaint(false)).await.unwrap();
        service
            .update_status(&admin, reviewed.id, status(ComplaintStatus::InReview))
            .await
            .unwrap();
        assert_eq!(
            service.delete(&author, reviewed.id).await.unwrap_err().status_code(),
            403
        );
        service.delete(&admin, reviewed.id).await.unwrap();
    }
}
