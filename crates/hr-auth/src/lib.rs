//! # hr-auth
//!
//! Authentication and authorization for the HR portal.
//!
//! ## Features
//!
//! - JWT user tokens and service-to-service tokens
//! - Argon2 password hashing
//! - Emailed one-time codes for two-factor login
//! - Role checks for employee and admin routes

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod two_factor;

pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService, TokenKind};
pub use middleware::{AuthError, Authenticator};
pub use password::{PasswordError, PasswordHasher};
pub use permissions::CurrentUser;
pub use two_factor::{IssuedCode, MemoryTwoFactorStore, TwoFactorError, TwoFactorStore};
