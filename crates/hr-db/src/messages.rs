//! Direct message store
//!
//! Table: messages

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_models::{Message, NewMessage};
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{Repository, RepositoryError, RepositoryResult};

const COLUMNS: &str = "id, sender_id, recipient_id, content, read_at, created_at";

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub content: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            content: row.content,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
pub trait MessageStore: Repository<Message, NewMessage> {
    /// Messages exchanged between two users, oldest first
    async fn conversation(
        &self,
        user_id: Id,
        other_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<Message>>;

    /// Messages received by a user, newest first
    async fn inbox(&self, user_id: Id, params: PaginationParams) -> RepositoryResult<Page<Message>>;

    /// Sets `read_at` once; later calls keep the first timestamp
    async fn mark_read(&self, id: Id) -> RepositoryResult<Message>;

    async fn unread_count(&self, user_id: Id) -> RepositoryResult<i64>;
}

/// PostgreSQL message store
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Message, NewMessage> for PgMessageStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Message>> {
        let sql = format!("SELECT {COLUMNS} FROM messages WHERE id = $1");
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Message::from))
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Message>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM messages ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total = self.count().await?;
        Ok(Page::new(rows, total, params).map(Message::from))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, input: NewMessage) -> RepositoryResult<Message> {
        let sql = format!(
            r#"
            INSERT INTO messages (sender_id, recipient_id, content)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(input.sender_id)
            .bind(input.recipient_id)
            .bind(&input.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("message", id));
        }
        Ok(())
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM messages WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn conversation(
        &self,
        user_id: Id,
        other_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<Message>> {
        let filter = "(sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1)";
        let sql = format!(
            "SELECT {COLUMNS} FROM messages WHERE {filter} ORDER BY created_at ASC, id ASC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(user_id)
            .bind(other_id)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let count_sql = format!("SELECT COUNT(*) FROM messages WHERE {filter}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(user_id)
            .bind(other_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(Page::new(rows, total, params).map(Message::from))
    }

    async fn inbox(&self, user_id: Id, params: PaginationParams) -> RepositoryResult<Page<Message>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS} FROM messages
            WHERE recipient_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(user_id)
            .bind(params.limit())
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await?;
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE recipient_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(Page::new(rows, total, params).map(Message::from))
    }

    async fn mark_read(&self, id: Id) -> RepositoryResult<Message> {
        let sql = format!(
            "UPDATE messages SET read_at = COALESCE(read_at, NOW()) WHERE id = $1 RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("message", id))?;
        Ok(row.into())
    }

    async fn unread_count(&self, user_id: Id) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

/// In-memory message store
pub struct MemoryMessageStore {
    table: MemoryTable<Message>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(),
        }
    }
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<Message, NewMessage> for MemoryMessageStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Message>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self, params: PaginationParams) -> RepositoryResult<Page<Message>> {
        Ok(self.table.page(|_| true, params).await)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.table.len().await)
    }

    async fn create(&self, input: NewMessage) -> RepositoryResult<Message> {
        let id = self.table.next_id();
        let message = Message {
            id,
            sender_id: input.sender_id,
            recipient_id: input.recipient_id,
            content: input.content,
            read_at: None,
            created_at: Utc::now(),
        };
        Ok(self.table.insert(id, message).await)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table
            .remove(id)
            .await
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("message", id))
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.table.contains(id).await)
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn conversation(
        &self,
        user_id: Id,
        other_id: Id,
        params: PaginationParams,
    ) -> RepositoryResult<Page<Message>> {
        let mut messages = self
            .table
            .filter(|m| {
                (m.sender_id == user_id && m.recipient_id == other_id)
                    || (m.sender_id == other_id && m.recipient_id == user_id)
            })
            .await;
        messages.reverse();
        Ok(Page::slice(messages, params))
    }

    async fn inbox(&self, user_id: Id, params: PaginationParams) -> RepositoryResult<Page<Message>> {
        Ok(self
            .table
            .page(|m| m.recipient_id == user_id, params)
            .await)
    }

    async fn mark_read(&self, id: Id) -> RepositoryResult<Message> {
        self.table
            .update(id, |message| {
                message.read_at.get_or_insert_with(Utc::now);
            })
            .await
            .ok_or_else(|| RepositoryError::not_found("message", id))
    }

    async fn unread_count(&self, user_id: Id) -> RepositoryResult<i64> {
        let unread = self
            .table
            .filter(|m| m.recipient_id == user_id && !m.is_read())
            .await;
        Ok(unread.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn send(store: &MemoryMessageStore, from: Id, to: Id, content: &str) -> Message {
        store
            .create(NewMessage {
                sender_id: from,
                recipient_id: to,
                content: content.into(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_conversation_is_chronological() {
        let store = MemoryMessageStore::new();
        send(&store, 1, 2, "hi").await;
        send(&store, 3, 2, "unrelated").await;
        send(&store, 2, 1, "hello").await;

        let page = store
            .conversation(2, 1, PaginationParams::default())
            .await
            .unwrap();
        let contents: Vec<_> = page.elements.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "hello"]);
    }

    #[tokio::test]
    async fn test_mark_read_keeps_first_timestamp() {
        let store = MemoryMessageStore::new();
        let message = send(&store, 1, 2, "shift report").await;
        send(&store, 3, 2, "lunch?").await;
        assert_eq!(store.unread_count(2).await.unwrap(), 2);

        let first = store.mark_read(message.id).await.unwrap();
        let second = store.mark_read(message.id).await.unwrap();
        assert!(first.read_at.is_some());
        assert_eq!(first.read_at, second.read_at);
        assert_eq!(store.unread_count(2).await.unwrap(), 1);
        assert_eq!(store.inbox(2, PaginationParams::default()).await.unwrap().total, 2);
    }
}
