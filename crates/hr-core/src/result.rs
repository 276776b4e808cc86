//! Result type aliases

use crate::error::HrError;

/// Standard Result type for portal operations
pub type HrResult<T> = Result<T, HrError>;
