//! Direct messages between portal users

use std::sync::Arc;

use hr_auth::CurrentUser;
use hr_contracts::MessageContract;
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_core::{HrError, HrResult};
use hr_db::{MessageStore, Repository, UserStore};
use hr_models::{Message, NewMessage};
use tracing::{debug, instrument};

use crate::base::{found, validate};

pub struct MessageService {
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserStore>,
}

impl MessageService {
    pub fn new(messages: Arc<dyn MessageStore>, users: Arc<dyn UserStore>) -> Self {
        Self { messages, users }
    }

    #[instrument(skip(self, input), fields(sender_id = current.id))]
    pub async fn send(&self, current: &CurrentUser, mut input: NewMessage) -> HrResult<Message> {
        input.sender_id = current.id;
        validate(&MessageContract, &input)?;

        if !self.users.exists(input.recipient_id).await? {
            return Err(HrError::not_found("user", input.recipient_id));
        }

        let message = self.messages.create(input).await?;
        debug!(message_id = message.id, recipient_id = message.recipient_id, "Message sent");
        Ok(message)
    }

    /// Both directions between the caller and `other_id`, oldest first
    pub async fn conversation(
        &self,
        current: &CurrentUser,
        other_id: Id,
        params: PaginationParams,
    ) -> HrResult<Page<Message>> {
        Ok(self
            .messages
            .conversation(current.id, other_id, params.normalized())
            .await?)
    }

    pub async fn inbox(
        &self,
        current: &CurrentUser,
        params: PaginationParams,
    ) -> HrResult<Page<Message>> {
        Ok(self.messages.inbox(current.id, params.normalized()).await?)
    }

    /// Only the recipient can mark a message read
    pub async fn mark_read(&self, current: &CurrentUser, id: Id) -> HrResult<Message> {
        let message = self.messages.find_by_id(id).await?;
        let message = found("message", id, message)?;

        if message.recipient_id != current.id {
            return Err(HrError::forbidden("Only the recipient can mark a message as read"));
        }
        if message.is_read() {
            return Ok(message);
        }
        Ok(self.messages.mark_read(id).await?)
    }

    pub async fn unread_count(&self, current: &CurrentUser) -> HrResult<i64> {
        Ok(self.messages.unread_count(current.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_db::{MemoryMessageStore, MemoryUserStore};
    use hr_models::{NewUser, Role};

    struct Fixture {
        service: MessageService,
        alice: CurrentUser,
        bob: CurrentUser,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserStore::new());
        let mut ids = Vec::new();
        for (code, email) in [("E-1", "alice@example.com"), ("E-2", "bob@example.com")] {
            let user = users
                .create(NewUser {
                    employee_code: code.to_string(),
                    first_name: "Test".to_string(),
                    last_name: code.to_string(),
                    email: email.to_string(),
                    role: Role::Employee,
                    department: None,
                    position: None,
                    password_hash: String::new(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }

        Fixture {
            service: MessageService::new(Arc::new(MemoryMessageStore::new()), users),
            alice: CurrentUser::employee(ids[0], "alice@example.com"),
            bob: CurrentUser::employee(ids[1], "bob@example.com"),
        }
    }

    fn message(to: Id, content: &str) -> NewMessage {
        NewMessage {
            sender_id: 0,
            recipient_id: to,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_and_read() {
        let f = fixture().await;
        let sent = f
            .service
            .send(&f.alice, message(f.bob.id, "Shift swap on Friday?"))
            .await
            .unwrap();
        assert_eq!(sent.sender_id, f.alice.id);

        assert_eq!(f.service.unread_count(&f.bob).await.unwrap(), 1);
        assert_eq!(
            f.service.mark_read(&f.alice, sent.id).await.unwrap_err().status_code(),
            403
        );

        let read = f.service.mark_read(&f.bob, sent.id).await.unwrap();
        assert!(read.is_read());
        assert_eq!(f.service.unread_count(&f.bob).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_send_checks_recipient() {
        let f = fixture().await;
        let missing = f.service.send(&f.alice, message(999, "Hello?")).await;
        assert_eq!(missing.unwrap_err().status_code(), 404);

        let to_self = f.service.send(&f.alice, message(f.alice.id, "Note to self")).await;
        assert_eq!(to_self.unwrap_err().status_code(), 422);
    }

    #[tokio::test]
    async fn test_conversation_and_inbox() {
        let f = fixture().await;
        f.service.send(&f.alice, message(f.bob.id, "first")).await.unwrap();
        f.service.send(&f.bob, message(f.alice.id, "second")).await.unwrap();
        f.service.send(&f.alice, message(f.bob.id, "third")).await.unwrap();

        let thread = f
            .service
            .conversation(&f.bob, f.alice.id, PaginationParams::default())
            .await
            .unwrap();
        let contents: Vec<&str> = thread.elements.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);

        let inbox = f.service.inbox(&f.bob, PaginationParams::default()).await.unwrap();
        assert_eq!(inbox.total, 2);
        assert_eq!(inbox.elements[0].content, "third");
    }
}
