//! JWT Authentication
//!
//! User tokens carry the account id, email and role. Service tokens are
//! minted for outbound calls to the sibling HR modules and are never
//! accepted on user routes.

use hr_core::traits::Id;
use hr_models::Role;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who a token was issued to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    User,
    Service,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, or the service name for service tokens
    pub sub: String,
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    pub jti: String,
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// JWT service for creating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service with the given secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    fn encode_claims(
        &self,
        sub: String,
        kind: TokenKind,
        email: Option<String>,
        role: Option<Role>,
        expires_in_seconds: u64,
    ) -> Result<String, JwtError> {
        let now = chrono::Utc::now().timestamp().max(0) as usize;

        let claims = Claims {
            sub,
            kind,
            email,
            role,
            exp: now + expires_in_seconds as usize,
            iat: now,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Create a session token for a portal user
    pub fn create_user_token(
        &self,
        user_id: Id,
        email: &str,
        role: Role,
        expires_in_seconds: u64,
    ) -> Result<String, JwtError> {
        self.encode_claims(
            user_id.to_string(),
            TokenKind::User,
            Some(email.to_string()),
            Some(role),
            expires_in_seconds,
        )
    }

    /// Create a short-lived token identifying this service to another module
    pub fn create_service_token(
        &self,
        service: &str,
        expires_in_seconds: u64,
    ) -> Result<String, JwtError> {
        self.encode_claims(
            service.to_string(),
            TokenKind::Service,
            None,
            None,
            expires_in_seconds,
        )
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

    #[test]
    fn test_create_and_validate_user_token() {
        let service = JwtService::new(SECRET);
        let token = service
            .create_user_token(12, "mara@example.com", Role::Admin, 3600)
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "12");
        assert_eq!(claims.kind, TokenKind::User);
        assert_eq!(claims.email.as_deref(), Some("mara@example.com"));
        assert_eq!(claims.role, Some(Role::Admin));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_service_token() {
        let service = JwtService::new(SECRET);
        let token = service.create_service_token("hr4-portal", 300).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.kind, TokenKind::Service);
        assert_eq!(claims.sub, "hr4-portal");
        assert!(claims.role.is_none());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = JwtService::new(SECRET)
            .create_user_token(1, "a@b.co", Role::Employee, 60)
            .unwrap();
        let other = JwtService::new(b"another-secret-key-of-enough-size");
        assert!(matches!(other.validate_token(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(SECRET);
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "1".into(),
            kind: TokenKind::User,
            email: None,
            role: Some(Role::Employee),
            exp: now - 120,
            iat: now - 600,
            jti: "old".into(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
    }
}
