//! Account, profile and two-factor handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::traits::Id;
use hr_models::{ProfileUpdate, Role};
use hr_services::{LoginRequest, RegisterRequest};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{AdminUser, ApiJson, AppState, AuthenticatedUser, Pagination};

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state.services.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/auth/login
///
/// Answers with either a session or a pending two-factor challenge.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.services.auth.login(request).await?;
    Ok(Json(outcome))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.auth.profile(&user).await?))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.auth.update_profile(&user, update).await?))
}

/// GET /api/auth/users
pub async fn list_users(
    State(state): State<AppState>,
    admin: AdminUser,
    pagination: Pagination,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.auth.list_users(&admin, *pagination).await?))
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

/// PATCH /api/auth/users/:id/role
pub async fn set_role(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Id>,
    ApiJson(change): ApiJson<RoleChange>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.auth.set_role(&admin, id, change.role).await?))
}

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    pub message: &'static str,
}

/// POST /api/authenticator/send-code
pub async fn send_code(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendCodeRequest>,
) -> ApiResult<impl IntoResponse> {
    state.services.auth.send_code(&request.email).await?;
    Ok(Json(SendCodeResponse {
        message: "If the address belongs to an account, a code has been sent",
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

/// POST /api/authenticator/verify-code
pub async fn verify_code(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VerifyCodeRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .services
        .auth
        .verify_code(&request.email, request.code.trim())
        .await?;
    Ok(Json(session))
}
