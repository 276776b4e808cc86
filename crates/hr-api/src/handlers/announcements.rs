//! Announcement handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::traits::Id;
use hr_models::{NewAnnouncement, NewComment};

use crate::error::ApiResult;
use crate::extractors::{AdminUser, ApiJson, AppState, AuthenticatedUser, Pagination};

/// POST /api/announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(input): ApiJson<NewAnnouncement>,
) -> ApiResult<impl IntoResponse> {
    let announcement = state.services.announcements.publish(&admin, input).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// GET /api/announcements
pub async fn list_announcements(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.announcements.list(*pagination).await?))
}

/// GET /api/announcements/:id
pub async fn get_announcement(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.announcements.get(id).await?))
}

/// POST /api/announcements/:id/like
pub async fn toggle_like(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.announcements.toggle_like(&user, id).await?))
}

/// POST /api/announcements/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    ApiJson(input): ApiJson<NewComment>,
) -> ApiResult<impl IntoResponse> {
    let comment = state.services.announcements.comment(&user, id, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/announcements/:id
pub async fn delete_announcement(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    state.services.announcements.delete(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
