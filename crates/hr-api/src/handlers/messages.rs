//! Messaging handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::traits::Id;
use hr_models::NewMessage;
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::{ApiJson, AppState, AuthenticatedUser, Pagination};

/// POST /api/messages
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(input): ApiJson<NewMessage>,
) -> ApiResult<impl IntoResponse> {
    let message = state.services.messages.send(&user, input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/messages/inbox
pub async fn inbox(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.messages.inbox(&user, *pagination).await?))
}

/// GET /api/messages/conversation/:user_id
pub async fn conversation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(other_id): Path<Id>,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .services
            .messages
            .conversation(&user, other_id, *pagination)
            .await?,
    ))
}

/// PATCH /api/messages/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.messages.mark_read(&user, id).await?))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

/// GET /api/messages/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let count = state.services.messages.unread_count(&user).await?;
    Ok(Json(UnreadCount { count }))
}
