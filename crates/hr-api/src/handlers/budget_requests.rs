//! Budget request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::traits::Id;
use hr_models::{BudgetDecision, NewBudgetRequest};

use crate::error::ApiResult;
use crate::extractors::{AdminUser, ApiJson, AppState, AuthenticatedUser, Pagination};

/// POST /api/budget-requests
pub async fn create_budget_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(input): ApiJson<NewBudgetRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = state.services.budget.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/budget-requests
pub async fn list_budget_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.budget.list(&user, *pagination).await?))
}

/// GET /api/budget-requests/:id
pub async fn get_budget_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.budget.get(&user, id).await?))
}

/// POST /api/budget-requests/:id/submit
///
/// Forwards the request to finance; a finance outage answers 502 and
/// leaves the request pending.
pub async fn submit_budget_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.budget.submit_to_finance(&user, id).await?))
}

/// PATCH /api/budget-requests/:id/decision
pub async fn decide_budget_request(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Id>,
    ApiJson(decision): ApiJson<BudgetDecision>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.budget.decide(&admin, id, decision).await?))
}
