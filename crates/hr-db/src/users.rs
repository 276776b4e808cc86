//! User store
//!
//! Table: users

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_models::{NewUser, User, UserUpdate};
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{unique_violation, Repository, RepositoryError, RepositoryResult};

const COLUMNS: &str = "id, employee_code, first_name, last_name, email, role, department, \
                       position, profile_picture_url, two_factor_enabled, password_hash, \
                       created_at, updated_at";

const DUPLICATE: &str = "email or employee code already registered";

/// User database row
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub profile_picture_url: Option<String>,
    pub two_factor_enabled: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            employee_code: row.employee_code,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: row.role.parse()?,
            department: row.department,
            position: row.position,
            profile_picture_url: row.profile_picture_url,
            two_factor_enabled: row.two_factor_enabled,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
pub trait UserStore: Repository<User, NewUser> {
    /// Emails are stored lowercased; callers normalize before lookup
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn find_by_employee_code(&self, code: &str) -> RepositoryResult<Option<User>>;

    async fn update(&self, id: Id, update: UserUpdate) -> RepositoryResult<User>;
}

/// PostgreSQL user store
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one_by(&self, column: &str, value: &str) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl Repository<User, NewUser> for PgUserStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<User>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM users ORDER BY last_name ASC, first_name ASC, id ASC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = self.count().await?;
        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Page::new(users, total, params))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, input: NewUser) -> RepositoryResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (employee_code, first_name, last_name, email, role,
                               department, position, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&input.employee_code)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(input.role.as_str())
            .bind(&input.department)
            .bind(&input.position)
            .bind(&input.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation(e, DUPLICATE))?;
        User::try_from(row)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("user", id));
        }
        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.find_one_by("email", email).await
    }

    async fn find_by_employee_code(&self, code: &str) -> RepositoryResult<Option<User>> {
        self.find_one_by("employee_code", code).await
    }

    async fn update(&self, id: Id, update: UserUpdate) -> RepositoryResult<User> {
        let sql = format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                department = COALESCE($4, department),
                position = COALESCE($5, position),
                profile_picture_url = COALESCE($6, profile_picture_url),
                two_factor_enabled = COALESCE($7, two_factor_enabled),
                role = COALESCE($8, role),
                password_hash = COALESCE($9, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.department)
            .bind(&update.position)
            .bind(&update.profile_picture_url)
            .bind(update.two_factor_enabled)
            .bind(update.role.map(|r| r.as_str()))
            .bind(&update.password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("user", id))?;
        User::try_from(row)
    }
}

/// In-memory user store
pub struct MemoryUserStore {
    table: MemoryTable<User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<User, NewUser> for MemoryUserStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<User>> {
        let mut users = self.table.filter(|_| true).await;
        users.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(Page::slice(users, params))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.table.len().await)
    }

    async fn create(&self, input: NewUser) -> RepositoryResult<User> {
        let taken = self
            .table
            .any(|u| u.email == input.email || u.employee_code == input.employee_code)
            .await;
        if taken {
            return Err(RepositoryError::Conflict(DUPLICATE.to_string()));
        }

        let now = Utc::now();
        let id = self.table.next_id();
        let user = User {
            id,
            employee_code: input.employee_code,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            role: input.role,
            department: input.department,
            position: input.position,
            profile_picture_url: None,
            two_factor_enabled: false,
            password_hash: input.password_hash,
            created_at: now,
            updated_at: now,
        };
        Ok(self.table.insert(id, user).await)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("user", id))
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.table.contains(id).await)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.table.filter(|u| u.email == email).await.into_iter().next())
    }

    async fn find_by_employee_code(&self, code: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .table
            .filter(|u| u.employee_code == code)
            .await
            .into_iter()
            .next())
    }

    async fn update(&self, id: Id, update: UserUpdate) -> RepositoryResult<User> {
        self.table
            .update(id, |user| {
                if let Some(v) = update.first_name {
                    user.first_name = v;
                }
                if let Some(v) = update.last_name {
                    user.last_name = v;
                }
                if let Some(v) = update.department {
                    user.department = Some(v);
                }
                if let Some(v) = update.position {
                    user.position = Some(v);
                }
                if let Some(v) = update.profile_picture_url {
                    user.profile_picture_url = Some(v);
                }
                if let Some(v) = update.two_factor_enabled {
                    user.two_factor_enabled = v;
                }
                if let Some(v) = update.role {
                    user.role = v;
                }
                if let Some(v) = update.password_hash {
                    user.password_hash = v;
                }
                user.updated_at = Utc::now();
            })
            .await
            .ok_or_else(|| RepositoryError::not_found("user", id))
    }
}
