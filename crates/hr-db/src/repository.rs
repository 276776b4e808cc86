//! Repository traits and shared error handling
//!
//! Every collection gets a store trait extending [`Repository`]; the
//! services only ever see `Arc<dyn XxxStore>`.

use async_trait::async_trait;
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_core::HrError;
use hr_models::ParseEnumError;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Id },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored value could not be mapped back onto the model
    #[error("Corrupt row: {0}")]
    Decode(#[from] ParseEnumError),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: Id) -> Self {
        RepositoryError::NotFound { entity, id }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for HrError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => HrError::not_found(entity, id),
            RepositoryError::Conflict(message) => HrError::conflict(message),
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "database error");
                HrError::Database(e.to_string())
            }
            RepositoryError::Decode(e) => HrError::Internal(e.to_string()),
        }
    }
}

/// Map unique violations onto [`RepositoryError::Conflict`]
pub(crate) fn unique_violation(err: sqlx::Error, message: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(message.to_string())
        }
        _ => RepositoryError::Database(err),
    }
}

/// Base repository trait shared by every collection
#[async_trait]
pub trait Repository<T, C>: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<T>>;

    /// Newest first
    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<T>>;

    async fn count(&self) -> RepositoryResult<i64>;

    async fn create(&self, input: C) -> RepositoryResult<T>;

    /// Fails with `NotFound` when nothing was deleted
    async fn delete(&self, id: Id) -> RepositoryResult<()>;

    async fn exists(&self, id: Id) -> RepositoryResult<bool>;
}
