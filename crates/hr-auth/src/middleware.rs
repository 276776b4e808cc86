//! Request authentication
//!
//! Resolves an `Authorization: Bearer` header into the [`CurrentUser`]
//! named by the token. Callers re-check the role against the stored
//! account before trusting it.

use hr_core::traits::Id;
use hr_core::HrError;
use std::sync::Arc;
use thiserror::Error;

use crate::jwt::{extract_bearer_token, JwtError, JwtService, TokenKind};
use crate::permissions::CurrentUser;

/// Authentication errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required")]
    Required,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
}

impl From<AuthError> for HrError {
    fn from(err: AuthError) -> Self {
        HrError::unauthorized(err.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::Invalid(reason) => {
                tracing::debug!(%reason, "Rejected bearer token");
                AuthError::InvalidCredentials
            }
            JwtError::EncodingFailed(_) => AuthError::InvalidCredentials,
        }
    }
}

/// Authenticator for user routes
#[derive(Clone)]
pub struct Authenticator {
    jwt: Arc<JwtService>,
}

impl Authenticator {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }

    /// Authenticate from the raw `Authorization` header value
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<CurrentUser, AuthError> {
        let header = authorization.ok_or(AuthError::Required)?;
        let token = extract_bearer_token(header).ok_or(AuthError::Required)?;

        let claims = self.jwt.validate_token(token)?;
        if claims.kind != TokenKind::User {
            return Err(AuthError::InvalidCredentials);
        }

        let id: Id = claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidCredentials)?;
        let role = claims.role.ok_or(AuthError::InvalidCredentials)?;

        Ok(CurrentUser::new(id, claims.email.unwrap_or_default(), role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_models::Role;

    fn authenticator() -> (Authenticator, Arc<JwtService>) {
        let jwt = Arc::new(JwtService::new(b"test-secret-key-at-least-32-bytes"));
        (Authenticator::new(jwt.clone()), jwt)
    }

    #[test]
    fn test_user_token() {
        let (auth, jwt) = authenticator();
        let token = jwt
            .create_user_token(9, "tess@example.com", Role::Employee, 600)
            .unwrap();

        let user = auth.authenticate(Some(&format!("Bearer {token}"))).unwrap();
        assert_eq!(user, CurrentUser::employee(9, "tess@example.com"));
    }

    #[test]
    fn test_missing_header() {
        let (auth, _) = authenticator();
        assert_eq!(auth.authenticate(None), Err(AuthError::Required));
        assert_eq!(auth.authenticate(Some("Basic abc")), Err(AuthError::Required));
    }

    #[test]
    fn test_service_token_rejected() {
        let (auth, jwt) = authenticator();
        let token = jwt.create_service_token("hr4-portal", 60).unwrap();
        assert_eq!(
            auth.authenticate(Some(&format!("Bearer {token}"))),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_garbage_token() {
        let (auth, _) = authenticator();
        assert_eq!(
            auth.authenticate(Some("Bearer not.a.jwt")),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(HrError::from(AuthError::TokenExpired).status_code(), 401);
        assert_eq!(HrError::from(AuthError::Required).status_code(), 401);
    }
}
