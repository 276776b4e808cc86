//! Announcements with likes and comments
//!
//! Tables: announcements, announcement_likes, announcement_comments

use chrono::{DateTime, Utc};
use hr_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Id,
    pub author_id: Id,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    /// Ids of users who liked the announcement
    pub likes: Vec<Id>,
    pub comments: Vec<AnnouncementComment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_liked_by(&self, user_id: Id) -> bool {
        self.likes.contains(&user_id)
    }
}

impl Identifiable for Announcement {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Announcement {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementComment {
    pub id: Id,
    pub announcement_id: Id,
    pub user_id: Id,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    #[serde(skip)]
    pub author_id: Id,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(skip)]
    pub announcement_id: Id,
    #[serde(skip)]
    pub user_id: Id,
    pub content: String,
}
