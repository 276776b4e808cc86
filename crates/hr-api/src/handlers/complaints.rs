//! Grievance handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::traits::Id;
use hr_models::{ComplaintUpdate, NewComplaint};

use crate::error::ApiResult;
use crate::extractors::{AdminUser, ApiJson, AppState, AuthenticatedUser, Pagination};

/// POST /api/complaints
pub async fn create_complaint(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(input): ApiJson<NewComplaint>,
) -> ApiResult<impl IntoResponse> {
    let complaint = state.services.grievances.submit(&user, input).await?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

/// GET /api/complaints
pub async fn list_complaints(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.grievances.list(&user, *pagination).await?))
}

/// GET /api/complaints/:id
pub async fn get_complaint(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.grievances.get(&user, id).await?))
}

/// PATCH /api/complaints/:id/status
pub async fn update_complaint_status(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Id>,
    ApiJson(update): ApiJson<ComplaintUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .services
            .grievances
            .update_status(&admin, id, update)
            .await?,
    ))
}

/// DELETE /api/complaints/:id
pub async fn delete_complaint(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    state.services.grievances.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
