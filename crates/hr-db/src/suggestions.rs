//! Suggestion store
//!
//! Table: suggestions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_models::{NewSuggestion, Suggestion, SuggestionStatus, SuggestionUpdate};
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{Repository, RepositoryError, RepositoryResult};

const COLUMNS: &str =
    "id, employee_id, title, description, category, status, admin_feedback, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct SuggestionRow {
    pub id: i64,
    pub employee_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub admin_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SuggestionRow> for Suggestion {
    type Error = RepositoryError;

    fn try_from(row: SuggestionRow) -> Result<Self, Self::Error> {
        Ok(Suggestion {
            id: row.id,
            employee_id: row.employee_id,
            title: row.title,
            description: row.description,
            category: row.category,
            status: row.status.parse()?,
            admin_feedback: row.admin_feedback,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_suggestions(rows: Vec<SuggestionRow>) -> RepositoryResult<Vec<Suggestion>> {
    rows.into_iter().map(Suggestion::try_from).collect()
}

#[async_trait]
pub trait SuggestionStore: Repository<Suggestion, NewSuggestion> {
    async fn find_by_employee(
        &self,
        employee_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<Suggestion>>;

    async fn review(&self, id: Id, update: SuggestionUpdate) -> RepositoryResult<Suggestion>;
}

/// PostgreSQL suggestion store
pub struct PgSuggestionStore {
    pool: PgPool,
}

impl PgSuggestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Suggestion, NewSuggestion> for PgSuggestionStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Suggestion>> {
        let sql = format!("SELECT {COLUMNS} FROM suggestions WHERE id = $1");
        let row = sqlx::query_as::<_, SuggestionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Suggestion::try_from).transpose()
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Suggestion>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM suggestions ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, SuggestionRow>(&sql)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = self.count().await?;
        Ok(Page::new(into_suggestions(rows)?, total, params))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suggestions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, input: NewSuggestion) -> RepositoryResult<Suggestion> {
        let sql = format!(
            r#"
            INSERT INTO suggestions (employee_id, title, description, category)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SuggestionRow>(&sql)
            .bind(input.employee_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .fetch_one(&self.pool)
            .await?;
        Suggestion::try_from(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM suggestions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("suggestion", id));
        }
        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suggestions WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl SuggestionStore for PgSuggestionStore {
    async fn find_by_employee(
        &self,
        employee_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<Suggestion>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS} FROM suggestions
            WHERE employee_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, SuggestionRow>(&sql)
            .bind(employee_id)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suggestions WHERE employee_id = $1")
                .bind(employee_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(Page::new(into_suggestions(rows)?, total, params))
    }

    async fn review(&self, id: Id, update: SuggestionUpdate) -> RepositoryResult<Suggestion> {
        let sql = format!(
            r#"
            UPDATE suggestions SET
                status = $2,
                admin_feedback = COALESCE($3, admin_feedback),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SuggestionRow>(&sql)
            .bind(id)
            .bind(update.status.as_str())
            .bind(&update.admin_feedback)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("suggestion", id))?;
        Suggestion::try_from(row)
    }
}

/// In-memory suggestion store
pub struct MemorySuggestionStore {
    table: MemoryTable<Suggestion>,
}

impl MemorySuggestionStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(),
        }
    }
}

impl Default for MemorySuggestionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<Suggestion, NewSuggestion> for MemorySuggestionStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Suggestion>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Suggestion>> {
        Ok(self.table.page(|_| true, params).await)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.table.len().await)
    }

    async fn create(&self, input: NewSuggestion) -> RepositoryResult<Suggestion> {
        let now = Utc::now();
        let id = self.table.next_id();
        let suggestion = Suggestion {
            id,
            employee_id: input.employee_id,
            title: input.title,
            description: input.description,
            category: input.category,
            status: SuggestionStatus::Pending,
            admin_feedback: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.table.insert(id, suggestion).await)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("suggestion", id))
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.table.contains(id).await)
    }
}

#[async_trait]
impl SuggestionStore for MemorySuggestionStore {
    async fn find_by_employee(
        &self,
        employee_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<Suggestion>> {
        Ok(self
            .table
            .page(|s| s.employee_id == employee_id, params)
            .await)
    }

    async fn review(&self, id: Id, update: SuggestionUpdate) -> RepositoryResult<Suggestion> {
        self.table
            .update(id, |suggestion| {
                suggestion.status = update.status;
                if update.admin_feedback.is_some() {
                    suggestion.admin_feedback = update.admin_feedback;
                }
                suggestion.updated_at = Utc::now();
            })
            .await
            .ok_or_else(|| RepositoryError::not_found("suggestion", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_review() {
        let store = MemorySuggestionStore::new();
        let created = store
            .create(NewSuggestion {
                employee_id: 2,
                title: "Bike racks".into(),
                description: "Near gate B".into(),
                category: "Facilities".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.status, SuggestionStatus::Pending);

        let reviewed = store
            .review(
                created.id,
                SuggestionUpdate {
                    status: SuggestionStatus::Implemented,
                    admin_feedback: Some("Installed last week".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(reviewed.status, SuggestionStatus::Implemented);
        assert!(reviewed.updated_at >= created.updated_at);

        let mine = store.find_by_employee(2, PaginationParams::default()).await.unwrap();
        assert_eq!(mine.elements, vec![reviewed]);
    }
}
