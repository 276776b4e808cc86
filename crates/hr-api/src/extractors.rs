//! Axum extractors for API handlers

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use hr_auth::{Authenticator, CurrentUser, JwtService};
use hr_core::pagination::PaginationParams;
use hr_core::HrError;
use hr_services::HrServices;
use std::sync::Arc;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub services: HrServices,
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(services: HrServices, jwt: Arc<JwtService>) -> Self {
        Self {
            services,
            authenticator: Authenticator::new(jwt),
        }
    }
}

fn authorization(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Token claims checked against the stored account
async fn current_user(app_state: &AppState, parts: &Parts) -> Result<CurrentUser, ApiError> {
    let claimed = app_state
        .authenticator
        .authenticate(authorization(parts))
        .map_err(HrError::from)?;
    Ok(app_state.services.auth.current_user(claimed).await?)
}

/// Any signed-in user
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user = current_user(&app_state, parts).await?;
        Ok(AuthenticatedUser(user))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Signed-in user with the admin role
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user = current_user(&app_state, parts).await?;
        user.require_admin()?;
        Ok(AdminUser(user))
    }
}

impl std::ops::Deref for AdminUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// `pageSize`/`offset` query parameters; malformed values fall back to the defaults
pub struct Pagination(pub PaginationParams);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|_| Query(PaginationParams::default()));
        Ok(Pagination(params.normalized()))
    }
}

impl std::ops::Deref for Pagination {
    type Target = PaginationParams;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// JSON request body whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
