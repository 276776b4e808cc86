//! Announcement store
//!
//! Tables: announcements, announcement_likes, announcement_comments

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_models::{Announcement, AnnouncementComment, NewAnnouncement, NewComment};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::memory::MemoryTable;
use crate::repository::{Repository, RepositoryError, RepositoryResult};

const COLUMNS: &str = "id, author_id, title, content, image_url, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, announcement_id, user_id, content, created_at";

#[derive(Debug, Clone, FromRow)]
pub struct AnnouncementRow {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnnouncementRow {
    fn into_announcement(
        self,
        likes: Vec<Id>,
        comments: Vec<AnnouncementComment>,
    ) -> Announcement {
        Announcement {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
            image_url: self.image_url,
            likes,
            comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub announcement_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for AnnouncementComment {
    fn from(row: CommentRow) -> Self {
        AnnouncementComment {
            id: row.id,
            announcement_id: row.announcement_id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct LikeRow {
    announcement_id: i64,
    user_id: i64,
}

#[async_trait]
pub trait AnnouncementStore: Repository<Announcement, NewAnnouncement> {
    /// Adds the user's like, or removes it when already present
    async fn toggle_like(&self, id: Id, user_id: Id) -> RepositoryResult<Announcement>;

    async fn add_comment(&self, comment: NewComment) -> RepositoryResult<AnnouncementComment>;
}

/// PostgreSQL announcement store
pub struct PgAnnouncementStore {
    pool: PgPool,
}

impl PgAnnouncementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach likes and comments to a batch of rows with two queries
    async fn hydrate(&self, rows: Vec<AnnouncementRow>) -> RepositoryResult<Vec<Announcement>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let like_rows = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT announcement_id, user_id FROM announcement_likes
            WHERE announcement_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let comment_sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM announcement_comments WHERE announcement_id = ANY($1) ORDER BY created_at ASC, id ASC"
        );
        let comment_rows = sqlx::query_as::<_, CommentRow>(&comment_sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let mut likes: HashMap<Id, Vec<Id>> = HashMap::new();
        for like in like_rows {
            likes.entry(like.announcement_id).or_default().push(like.user_id);
        }
        let mut comments: HashMap<Id, Vec<AnnouncementComment>> = HashMap::new();
        for comment in comment_rows {
            comments
                .entry(comment.announcement_id)
                .or_default()
                .push(comment.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_announcement(
                    likes.remove(&id).unwrap_or_default(),
                    comments.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }
}

#[async_trait]
impl Repository<Announcement, NewAnnouncement> for PgAnnouncementStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Announcement>> {
        let sql = format!("SELECT {COLUMNS} FROM announcements WHERE id = $1");
        let row = sqlx::query_as::<_, AnnouncementRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Announcement>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM announcements ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, AnnouncementRow>(&sql)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = self.count().await?;
        Ok(Page::new(self.hydrate(rows).await?, total, params))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM announcements")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, input: NewAnnouncement) -> RepositoryResult<Announcement> {
        let sql = format!(
            r#"
            INSERT INTO announcements (author_id, title, content, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AnnouncementRow>(&sql)
            .bind(input.author_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.image_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into_announcement(Vec::new(), Vec::new()))
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("announcement", id));
        }
        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM announcements WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl AnnouncementStore for PgAnnouncementStore {
    async fn toggle_like(&self, id: Id, user_id: Id) -> RepositoryResult<Announcement> {
        if !self.exists(id).await? {
            return Err(RepositoryError::not_found("announcement", id));
        }

        let removed = sqlx::query(
            "DELETE FROM announcement_likes WHERE announcement_id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if removed.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO announcement_likes (announcement_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("announcement", id))
    }

    async fn add_comment(&self, comment: NewComment) -> RepositoryResult<AnnouncementComment> {
        if !self.exists(comment.announcement_id).await? {
            return Err(RepositoryError::not_found(
                "announcement",
                comment.announcement_id,
            ));
        }

        let sql = format!(
            r#"
            INSERT INTO announcement_comments (announcement_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(comment.announcement_id)
            .bind(comment.user_id)
            .bind(&comment.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }
}

/// In-memory announcement store
pub struct MemoryAnnouncementStore {
    table: MemoryTable<Announcement>,
    next_comment_id: AtomicI64,
}

impl MemoryAnnouncementStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(),
            next_comment_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryAnnouncementStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<Announcement, NewAnnouncement> for MemoryAnnouncementStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Announcement>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Announcement>> {
        Ok(self.table.page(|_| true, params).await)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.table.len().await)
    }

    async fn create(&self, input: NewAnnouncement) -> RepositoryResult<Announcement> {
        let now = Utc::now();
        let id = self.table.next_id();
        let announcement = Announcement {
            id,
            author_id: input.author_id,
            title: input.title,
            content: input.content,
            image_url: input.image_url,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        Ok(self.table.insert(id, announcement).await)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("announcement", id))
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.table.contains(id).await)
    }
}

#[async_trait]
impl AnnouncementStore for MemoryAnnouncementStore {
    async fn toggle_like(&self, id: Id, user_id: Id) -> RepositoryResult<Announcement> {
        self.table
            .update(id, |announcement| {
                if let Some(pos) = announcement.likes.iter().position(|u| *u == user_id) {
                    announcement.likes.remove(pos);
                } else {
                    announcement.likes.push(user_id);
                }
            })
            .await
            .ok_or_else(|| RepositoryError::not_found("announcement", id))
    }

    async fn add_comment(&self, comment: NewComment) -> RepositoryResult<AnnouncementComment> {
        let created = AnnouncementComment {
            id: self.next_comment_id.fetch_add(1, Ordering::SeqCst),
            announcement_id: comment.announcement_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        let announcement_id = comment.announcement_id;
        let stored = created.clone();
        self.table
            .update(announcement_id, move |announcement| {
                announcement.comments.push(stored)
            })
            .await
            .ok_or_else(|| RepositoryError::not_found("announcement", announcement_id))?;
        Ok(created)
    }
}
