//! # hr-api
//!
//! JSON REST handlers for the HR portal.
//!
//! Handlers stay thin: extract the caller and the body, call the matching
//! service, and map [`HrError`](hr_core::HrError) onto HTTP statuses.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::AppState;
pub use routes::{router, MULTIPART_OVERHEAD};
