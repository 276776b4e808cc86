//! Action report store
//!
//! Table: action_reports

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_models::{ActionReport, NewActionReport};
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{Repository, RepositoryError, RepositoryResult};

const COLUMNS: &str = "id, employee_id, complaint_id, reported_by, action_taken, remarks, \
                       violation_reference, created_at";

#[derive(Debug, Clone, FromRow)]
pub struct ActionReportRow {
    pub id: i64,
    pub employee_id: i64,
    pub complaint_id: Option<i64>,
    pub reported_by: i64,
    pub action_taken: String,
    pub remarks: Option<String>,
    pub violation_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActionReportRow> for ActionReport {
    fn from(row: ActionReportRow) -> Self {
        ActionReport {
            id: row.id,
            employee_id: row.employee_id,
            complaint_id: row.complaint_id,
            reported_by: row.reported_by,
            action_taken: row.action_taken,
            remarks: row.remarks,
            violation_reference: row.violation_reference,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
pub trait ActionReportStore: Repository<ActionReport, NewActionReport> {
    async fn find_by_employee(
        &self,
        employee_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<ActionReport>>;
}

/// PostgreSQL action report store
pub struct PgActionReportStore {
    pool: PgPool,
}

impl PgActionReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<ActionReport, NewActionReport> for PgActionReportStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ActionReport>> {
        let sql = format!("SELECT {COLUMNS} FROM action_reports WHERE id = $1");
        let row = sqlx::query_as::<_, ActionReportRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ActionReport::from))
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<ActionReport>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM action_reports ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, ActionReportRow>(&sql)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = self.count().await?;
        Ok(Page::new(rows, total, params).map(ActionReport::from))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM action_reports")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, input: NewActionReport) -> RepositoryResult<ActionReport> {
        let sql = format!(
            r#"
            INSERT INTO action_reports (employee_id, complaint_id, reported_by, action_taken,
                                        remarks, violation_reference)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ActionReportRow>(&sql)
            .bind(input.employee_id)
            .bind(input.complaint_id)
            .bind(input.reported_by)
            .bind(&input.action_taken)
            .bind(&input.remarks)
            .bind(&input.violation_reference)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM action_reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("action report", id));
        }
        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM action_reports WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl ActionReportStore for PgActionReportStore {
    async fn find_by_employee(
        &self,
        employee_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<ActionReport>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS} FROM action_reports
            WHERE employee_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, ActionReportRow>(&sql)
            .bind(employee_id)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM action_reports WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Page::new(rows, total, params).map(ActionReport::from))
    }
}

/// In-memory action report store
pub struct MemoryActionReportStore {
    table: MemoryTable<ActionReport>,
}

impl MemoryActionReportStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(),
        }
    }
}

impl Default for MemoryActionReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<ActionReport, NewActionReport> for MemoryActionReportStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ActionReport>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<ActionReport>> {
        Ok(self.table.page(|_| true, params).await)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.table.len().await)
    }

    async fn create(&self, input: NewActionReport) -> RepositoryResult<ActionReport> {
        let id = self.table.next_id();
        let report = ActionReport {
            id,
            employee_id: input.employee_id,
            complaint_id: input.complaint_id,
            reported_by: input.reported_by,
            action_taken: input.action_taken,
            remarks: input.remarks,
            violation_reference: input.violation_reference,
            created_at: Utc::now(),
        };
        Ok(self.table.insert(id, report).await)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("action report", id))
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.table.contains(id).await)
    }
}

#[async_trait]
impl ActionReportStore for MemoryActionReportStore {
    async fn find_by_employee(
        &self,
        employee_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<ActionReport>> {
        Ok(self
            .table
            .page(|r| r.employee_id == employee_id, params)
            .await)
    }
}
