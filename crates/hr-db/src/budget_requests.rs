//! Budget request store
//!
//! Table: budget_requests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_models::{BudgetRequest, BudgetRequestUpdate, BudgetStatus, NewBudgetRequest};
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{Repository, RepositoryError, RepositoryResult};

const COLUMNS: &str = "id, requested_by, department, title, amount, justification, document_url, \
                       status, finance_reference, reviewer_note, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct BudgetRequestRow {
    pub id: i64,
    pub requested_by: i64,
    pub department: String,
    pub title: String,
    pub amount: f64,
    pub justification: String,
    pub document_url: String,
    pub status: String,
    pub finance_reference: Option<String>,
    pub reviewer_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BudgetRequestRow> for BudgetRequest {
    type Error = RepositoryError;

    fn try_from(row: BudgetRequestRow) -> Result<Self, Self::Error> {
        Ok(BudgetRequest {
            id: row.id,
            requested_by: row.requested_by,
            department: row.department,
            title: row.title,
            amount: row.amount,
            justification: row.justification,
            document_url: row.document_url,
            status: row.status.parse()?,
            finance_reference: row.finance_reference,
            reviewer_note: row.reviewer_note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_requests(rows: Vec<BudgetRequestRow>) -> RepositoryResult<Vec<BudgetRequest>> {
    rows.into_iter().map(BudgetRequest::try_from).collect()
}

#[async_trait]
pub trait BudgetRequestStore: Repository<BudgetRequest, NewBudgetRequest> {
    async fn find_by_requester(
        &self,
        user_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<BudgetRequest>>;

    async fn update(&self, id: Id, update: BudgetRequestUpdate) -> RepositoryResult<BudgetRequest>;
}

/// PostgreSQL budget request store
pub struct PgBudgetRequestStore {
    pool: PgPool,
}

impl PgBudgetRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<BudgetRequest, NewBudgetRequest> for PgBudgetRequestStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<BudgetRequest>> {
        let sql = format!("SELECT {COLUMNS} FROM budget_requests WHERE id = $1");
        let row = sqlx::query_as::<_, BudgetRequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(BudgetRequest::try_from).transpose()
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<BudgetRequest>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM budget_requests ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, BudgetRequestRow>(&sql)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = self.count().await?;
        Ok(Page::new(into_requests(rows)?, total, params))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM budget_requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, input: NewBudgetRequest) -> RepositoryResult<BudgetRequest> {
        let sql = format!(
            r#"
            INSERT INTO budget_requests (requested_by, department, title, amount, justification, document_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, BudgetRequestRow>(&sql)
            .bind(input.requested_by)
            .bind(&input.department)
            .bind(&input.title)
            .bind(input.amount)
            .bind(&input.justification)
            .bind(&input.document_url)
            .fetch_one(&self.pool)
            .await?;
        BudgetRequest::try_from(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM budget_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("budget request", id));
        }
        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM budget_requests WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl BudgetRequestStore for PgBudgetRequestStore {
    async fn find_by_requester(
        &self,
        user_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<BudgetRequest>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS} FROM budget_requests
            WHERE requested_by = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, BudgetRequestRow>(&sql)
            .bind(user_id)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM budget_requests WHERE requested_by = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Page::new(into_requests(rows)?, total, params))
    }

    async fn update(&self, id: Id, update: BudgetRequestUpdate) -> RepositoryResult<BudgetRequest> {
        let sql = format!(
            r#"
            UPDATE budget_requests SET
                status = COALESCE($2, status),
                finance_reference = COALESCE($3, finance_reference),
                reviewer_note = COALESCE($4, reviewer_note),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, BudgetRequestRow>(&sql)
            .bind(id)
            .bind(update.status.map(|s| s.as_str()))
            .bind(&update.finance_reference)
            .bind(&update.reviewer_note)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("budget request", id))?;
        BudgetRequest::try_from(row)
    }
}

/// In-memory budget request store
pub struct MemoryBudgetRequestStore {
    table: MemoryTable<BudgetRequest>,
}

impl MemoryBudgetRequestStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(),
        }
    }
}

impl Default for MemoryBudgetRequestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<BudgetRequest, NewBudgetRequest> for MemoryBudgetRequestStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<BudgetRequest>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<BudgetRequest>> {
        Ok(self.table.page(|_| true, params).await)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.table.len().await)
    }

    async fn create(&self, input: NewBudgetRequest) -> RepositoryResult<BudgetRequest> {
        let now = Utc::now();
        let id = self.table.next_id();
        let request = BudgetRequest {
            id,
            requested_by: input.requested_by,
            department: input.department,
            title: input.title,
            amount: input.amount,
            justification: input.justification,
            document_url: input.document_url,
            status: BudgetStatus::Pending,
            finance_reference: None,
            reviewer_note: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.table.insert(id, request).await)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("budget request", id))
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.table.contains(id).await)
    }
}

#[async_trait]
impl BudgetRequestStore for MemoryBudgetRequestStore {
    async fn find_by_requester(
        &self,
        user_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<BudgetRequest>> {
        Ok(self
            .table
            .page(|r| r.requested_by == user_id, params)
            .await)
    }

    async fn update(&self, id: Id, update: BudgetRequestUpdate) -> RepositoryResult<BudgetRequest> {
        self.table
            .update(id, |request| {
                if let Some(status) = update.status {
                    request.status = status;
                }
                if update.finance_reference.is_some() {
                    request.finance_reference = update.finance_reference;
                }
                if update.reviewer_note.is_some() {
                    request.reviewer_note = update.reviewer_note;
                }
                request.updated_at = Utc::now();
            })
            .await
            .ok_or_else(|| RepositoryError::not_found("budget request", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(requested_by: Id) -> NewBudgetRequest {
        NewBudgetRequest {
            requested_by,
            department: "Maintenance".into(),
            title: "Spare conveyor belts".into(),
            amount: 12_500.0,
            justification: "Line 2 belts are worn".into(),
            document_url: "https://files.example.com/quote.pdf".into(),
        }
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = MemoryBudgetRequestStore::new();
        let created = store.create(request(3)).await.unwrap();
        assert_eq!(created.status, BudgetStatus::Pending);

        let submitted = store
            .update(
                created.id,
                BudgetRequestUpdate {
                    status: Some(BudgetStatus::Submitted),
                    finance_reference: Some("FIN-0042".into()),
                    reviewer_note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(submitted.status, BudgetStatus::Submitted);
        assert_eq!(submitted.finance_reference.as_deref(), Some("FIN-0042"));

        let approved = store
            .update(
                created.id,
                BudgetRequestUpdate {
                    status: Some(BudgetStatus::Approved),
                    reviewer_note: Some("Within Q3 budget".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(approved.finance_reference.as_deref(), Some("FIN-0042"));
        assert_eq!(approved.reviewer_note.as_deref(), Some("Within Q3 budget"));
    }

    #[tokio::test]
    async fn test_find_by_requester() {
        let store = MemoryBudgetRequestStore::new();
        store.create(request(1)).await.unwrap();
        store.create(request(2)).await.unwrap();
        store.create(request(1)).await.unwrap();

        let page = store
            .find_by_requester(1, PaginationParams::new(1, 0))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.count, 1);
        assert_eq!(page.elements[0].id, 3);
    }
}
