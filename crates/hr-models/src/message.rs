//! Direct messages between portal users
//!
//! Table: messages

use chrono::{DateTime, Utc};
use hr_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Id,
    pub sender_id: Id,
    pub recipient_id: Id,
    pub content: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Whether `user_id` is one of the two parties
    pub fn involves(&self, user_id: Id) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }
}

impl Identifiable for Message {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Message {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    #[serde(skip)]
    pub sender_id: Id,
    pub recipient_id: Id,
    pub content: String,
}
