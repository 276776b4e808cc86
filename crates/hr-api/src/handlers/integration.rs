//! Sibling-service handlers: attendance mirror, training, violations and
//! the top-employee ranking

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{AdminUser, AppState, AuthenticatedUser, Pagination};

/// POST /api/integration/attendance/sync
pub async fn sync_attendance(
    State(state): State<AppState>,
    admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.integration.sync_attendance(&admin).await?))
}

/// GET /api/integration/employees
pub async fn list_employees(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.integration.employees(*pagination).await?))
}

/// GET /api/integration/training
pub async fn training_records(
    State(state): State<AppState>,
    admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.integration.training_records(&admin).await?))
}

/// GET /api/integration/violations
pub async fn violations(
    State(state): State<AppState>,
    admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.integration.violations(&admin).await?))
}

#[derive(Debug, Deserialize)]
pub struct TopEmployeesQuery {
    pub limit: Option<usize>,
}

/// GET /api/integration/top-employees
pub async fn top_employees(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    query: Option<Query<TopEmployeesQuery>>,
) -> ApiResult<impl IntoResponse> {
    let limit = query.and_then(|Query(q)| q.limit);
    Ok(Json(state.services.integration.top_employees(limit).await?))
}
