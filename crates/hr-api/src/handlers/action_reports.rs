//! Action report handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use hr_models::NewActionReport;

use crate::error::ApiResult;
use crate::extractors::{AdminUser, ApiJson, AppState, AuthenticatedUser, Pagination};

/// POST /api/action-reports
pub async fn create_action_report(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(input): ApiJson<NewActionReport>,
) -> ApiResult<impl IntoResponse> {
    let report = state.services.action_reports.create(&admin, input).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/action-reports
pub async fn list_action_reports(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.action_reports.list(&user, *pagination).await?))
}
