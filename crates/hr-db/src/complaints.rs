//! Complaint store
//!
//! Table: complaints

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_models::{Complaint, ComplaintStatus, ComplaintUpdate, NewComplaint};
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{Repository, RepositoryError, RepositoryResult};

const COLUMNS: &str = "id, employee_id, subject, description, category, anonymous, \
                       attachment_url, status, admin_response, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct ComplaintRow {
    pub id: i64,
    pub employee_id: i64,
    pub subject: String,
    pub description: String,
    pub category: String,
    pub anonymous: bool,
    pub attachment_url: Option<String>,
    pub status: String,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ComplaintRow> for Complaint {
    type Error = RepositoryError;

    fn try_from(row: ComplaintRow) -> Result<Self, Self::Error> {
        Ok(Complaint {
            id: row.id,
            employee_id: Some(row.employee_id),
            subject: row.subject,
            description: row.description,
            category: row.category,
            anonymous: row.anonymous,
            attachment_url: row.attachment_url,
            status: row.status.parse()?,
            admin_response: row.admin_response,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_complaints(rows: Vec<ComplaintRow>) -> RepositoryResult<Vec<Complaint>> {
    rows.into_iter().map(Complaint::try_from).collect()
}

#[async_trait]
pub trait ComplaintStore: Repository<Complaint, NewComplaint> {
    async fn find_by_employee(
        &self,
        employee_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<Complaint>>;

    /// Writes the new status and, when given, the admin response
    async fn update_status(&self, id: Id, update: ComplaintUpdate) -> RepositoryResult<Complaint>;
}

/// PostgreSQL complaint store
pub struct PgComplaintStore {
    pool: PgPool,
}

impl PgComplaintStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Complaint, NewComplaint> for PgComplaintStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Complaint>> {
        let sql = format!("SELECT {COLUMNS} FROM complaints WHERE id = $1");
        let row = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Complaint::try_from).transpose()
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Complaint>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM complaints ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = self.count().await?;
        Ok(Page::new(into_complaints(rows)?, total, params))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM complaints")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, input: NewComplaint) -> RepositoryResult<Complaint> {
        let sql = format!(
            r#"
            INSERT INTO complaints (employee_id, subject, description, category, anonymous, attachment_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(input.employee_id)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.anonymous)
            .bind(&input.attachment_url)
            .fetch_one(&self.pool)
            .await?;
        Complaint::try_from(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("complaint", id));
        }
        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM complaints WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl ComplaintStore for PgComplaintStore {
    async fn find_by_employee(
        &self,
        employee_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<Complaint>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS} FROM complaints
            WHERE employee_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(employee_id)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM complaints WHERE employee_id = $1")
                .bind(employee_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(Page::new(into_complaints(rows)?, total, params))
    }

    async fn update_status(&self, id: Id, update: ComplaintUpdate) -> RepositoryResult<Complaint> {
        let sql = format!(
            r#"
            UPDATE complaints SET
                status = $2,
                admin_response = COALESCE($3, admin_response),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(id)
            .bind(update.status.as_str())
            .bind(&update.admin_response)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("complaint", id))?;
        Complaint::try_from(row)
    }
}

/// In-memory complaint store
pub struct MemoryComplaintStore {
    table: MemoryTable<Complaint>,
}

impl MemoryComplaintStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(),
        }
    }
}

impl Default for MemoryComplaintStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<Complaint, NewComplaint> for MemoryComplaintStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Complaint>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Complaint>> {
        Ok(self.table.page(|_| true, params).await)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.table.len().await)
    }

    async fn create(&self, input: NewComplaint) -> RepositoryResult<Complaint> {
        let now = Utc::now();
        let id = self.table.next_id();
        let complaint = Complaint {
            id,
            employee_id: Some(input.employee_id),
            subject: input.subject,
            description: input.description,
            category: input.category,
            anonymous: input.anonymous,
            attachment_url: input.attachment_url,
            status: ComplaintStatus::Pending,
            admin_response: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.table.insert(id, complaint).await)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("complaint", id))
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.table.contains(id).await)
    }
}

#[async_trait]
impl ComplaintStore for MemoryComplaintStore {
    async fn find_by_employee(
        &self,
        employee_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<Complaint>> {
        Ok(self
            .table
            .page(|c| c.employee_id == Some(employee_id), params)
            .await)
    }

    async fn update_status(&self, id: Id, update: ComplaintUpdate) -> RepositoryResult<Complaint> {
        self.table
            .update(id, |complaint| {
                complaint.status = update.status;
                if update.admin_response.is_some() {
                    complaint.admin_response = update.admin_response;
                }
                complaint.updated_at = Utc::now();
            })
            .await
            .ok_or_else(|| RepositoryError::not_found("complaint", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complaint(employee_id: Id, subject: &str) -> NewComplaint {
        NewComplaint {
            employee_id,
            subject: subject.into(),
            description: "Ventilation in bay 3 is broken".into(),
            category: "Safety".into(),
            anonymous: false,
            attachment_url: None,
        }
    }

    #[tokio::test]
    async fn test_new_complaints_are_pending() {
        let store = MemoryComplaintStore::new();
        let created = store.create(complaint(5, "Ventilation")).await.unwrap();

        assert_eq!(created.status, ComplaintStatus::Pending);
        assert_eq!(created.employee_id, Some(5));
        assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_find_by_employee_newest_first() {
        let store = MemoryComplaintStore::new();
        store.create(complaint(1, "first")).await.unwrap();
        store.create(complaint(2, "other")).await.unwrap();
        store.create(complaint(1, "second")).await.unwrap();

        let page = store
            .find_by_employee(1, PaginationParams::default())
            .await
            .unwrap();
        let subjects: Vec<_> = page.elements.iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(subjects, vec!["second", "first"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_update_status_keeps_response_when_omitted() {
        let store = MemoryComplaintStore::new();
        let created = store.create(complaint(1, "x")).await.unwrap();

        store
            .update_status(
                created.id,
                ComplaintUpdate {
                    status: ComplaintStatus::InReview,
                    admin_response: Some("Looking into it".into()),
                },
            )
            .await
            .unwrap();
        let updated = store
            .update_status(
                created.id,
                ComplaintUpdate {
                    status: ComplaintStatus::Resolved,
                    admin_response: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, ComplaintStatus::Resolved);
        assert_eq!(updated.admin_response.as_deref(), Some("Looking into it"));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let store = MemoryComplaintStore::new();
        assert!(matches!(
            store.delete(3).await,
            Err(RepositoryError::NotFound { entity: "complaint", id: 3 })
        ));
    }
}
