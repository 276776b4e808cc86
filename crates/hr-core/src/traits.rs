//! Core traits shared by the portal's entities

use chrono::{DateTime, Utc};

/// Primary key type
pub type Id = i64;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Id;
}

/// Trait for entities with timestamps
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc> {
        self.created_at()
    }
}

/// Trait for entities owned by a single employee account
pub trait Owned {
    fn owner_id(&self) -> Id;

    fn is_owned_by(&self, user_id: Id) -> bool {
        self.owner_id() == user_id
    }
}
