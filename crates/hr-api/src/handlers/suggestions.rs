//! Suggestion handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::traits::Id;
use hr_models::{NewSuggestion, SuggestionUpdate};

use crate::error::ApiResult;
use crate::extractors::{AdminUser, ApiJson, AppState, AuthenticatedUser, Pagination};

/// POST /api/suggestions
pub async fn create_suggestion(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(input): ApiJson<NewSuggestion>,
) -> ApiResult<impl IntoResponse> {
    let suggestion = state.services.suggestions.submit(&user, input).await?;
    Ok((StatusCode::CREATED, Json(suggestion)))
}

/// GET /api/suggestions
pub async fn list_suggestions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.suggestions.list(&user, *pagination).await?))
}

/// GET /api/suggestions/:id
pub async fn get_suggestion(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.suggestions.get(&user, id).await?))
}

/// PATCH /api/suggestions/:id/review
pub async fn review_suggestion(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Id>,
    ApiJson(update): ApiJson<SuggestionUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.suggestions.review(&admin, id, update).await?))
}
