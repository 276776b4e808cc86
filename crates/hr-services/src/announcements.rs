//! Company announcements with likes and comments

use std::sync::Arc;

use hr_auth::CurrentUser;
use hr_contracts::{AnnouncementContract, CommentContract};
use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use hr_core::HrResult;
use hr_db::{AnnouncementStore, Repository};
use hr_models::{Announcement, AnnouncementComment, NewAnnouncement, NewComment};
use tracing::{info, instrument};

use crate::base::{found, validate};

pub struct AnnouncementService {
    announcements: Arc<dyn AnnouncementStore>,
}

impl AnnouncementService {
    pub fn new(announcements: Arc<dyn AnnouncementStore>) -> Self {
        Self { announcements }
    }

    #[instrument(skip(self, input), fields(author_id = current.id))]
    pub async fn publish(
        &self,
        current: &CurrentUser,
        mut input: NewAnnouncement,
    ) -> HrResult<Announcement> {
        current.require_admin()?;
        input.author_id = current.id;
        validate(&AnnouncementContract, &input)?;

        let announcement = self.announcements.create(input).await?;
        info!(announcement_id = announcement.id, "Announcement published");
        Ok(announcement)
    }

    pub async fn list(&self, params: PaginationParams) -> HrResult<Page<Announcement>> {
        Ok(self.announcements.find_all(params.normalized()).await?)
    }

    pub async fn get(&self, id: Id) -> HrResult<Announcement> {
        let announcement = self.announcements.find_by_id(id).await?;
        found("announcement", id, announcement)
    }

    /// Like, or unlike when the caller already liked it
    pub async fn toggle_like(&self, current: &CurrentUser, id: Id) -> HrResult<Announcement> {
        Ok(self.announcements.toggle_like(id, current.id).await?)
    }

    pub async fn comment(
        &self,
        current: &CurrentUser,
        id: Id,
        mut input: NewComment,
    ) -> HrResult<AnnouncementComment> {
        input.announcement_id = id;
        input.user_id = current.id;
        validate(&CommentContract, &input)?;

        Ok(self.announcements.add_comment(input).await?)
    }

    #[instrument(skip(self), fields(admin_id = current.id))]
    pub async fn delete(&self, current: &CurrentUser, id: Id) -> HrResult<()> {
        current.require_admin()?;
        self.announcements.delete(id).await?;
        info!(announcement_id = id, "Announcement deleted");
        Ok(())
    }
}
