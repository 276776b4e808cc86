//! Announcement and comment contracts

use hr_core::error::ValidationErrors;
use hr_models::{NewAnnouncement, NewComment};

use crate::base::{validate_optional_text, validate_text, Contract, ValidationResult};

pub struct AnnouncementContract;

impl Contract<NewAnnouncement> for AnnouncementContract {
    fn validate(&self, entity: &NewAnnouncement) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_text("title", &entity.title, 200, &mut errors);
        validate_text("content", &entity.content, 10_000, &mut errors);
        validate_optional_text("imageUrl", entity.image_url.as_deref(), 2048, &mut errors);
        errors.into_result()
    }
}

pub struct CommentContract;

impl Contract<NewComment> for CommentContract {
    fn validate(&self, entity: &NewComment) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_text("content", &entity.content, 1000, &mut errors);
        errors.into_result()
    }
}
