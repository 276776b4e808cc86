//! API error handling
//!
//! Every failure leaves the API as
//! `{"error": "<code>", "message": "...", "details": {...}}`, where
//! `details` maps field names to messages for validation failures.

use std::collections::BTreeMap;

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hr_attachments::{StorageError, UploadError};
use hr_core::HrError;
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Service(HrError),
    /// Malformed request the services never saw
    BadRequest(String),
    /// Body over the configured limit
    PayloadTooLarge(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        ApiError::Service(err)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::Service(err.into())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Service(err.into())
    }
}

fn rejected(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(message)
    } else {
        ApiError::BadRequest(message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        rejected(err.status(), err.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::BadRequest(message) => ErrorBody {
                error: "bad_request",
                message,
                details: None,
            },
            ApiError::PayloadTooLarge(message) => ErrorBody {
                error: "payload_too_large",
                message,
                details: None,
            },
            ApiError::Service(HrError::Validation(errors)) => ErrorBody {
                error: "validation_failed",
                message: errors.full_messages().join(", "),
                details: Some(errors.errors),
            },
            ApiError::Service(err) if status.is_server_error() => {
                // details stay in the log
                tracing::error!(error = %err, "Request failed");
                let message = match &err {
                    HrError::ExternalService { service, .. } => {
                        format!("Upstream service {service} is unavailable")
                    }
                    _ => "Internal server error".to_string(),
                };
                ErrorBody {
                    error: err.error_code(),
                    message,
                    details: None,
                }
            }
            ApiError::Service(err) => ErrorBody {
                error: err.error_code(),
                message: err.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use hr_core::error::ValidationErrors;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_details() {
        let mut errors = ValidationErrors::new();
        errors.add("subject", "can't be blank");

        let (status, body) = render(HrError::Validation(errors).into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["details"]["subject"][0], "can't be blank");
    }

    #[tokio::test]
    async fn test_server_errors_are_masked() {
        let (status, body) = render(HrError::Database("relation missing".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("details").is_none());

        let (status, body) = render(
            HrError::ExternalService {
                service: "finance".into(),
                message: "503".into(),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "external_service_error");
        assert_eq!(body["message"], "Upstream service finance is unavailable");
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let (status, body) = render(HrError::forbidden("Admins only").into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
        assert_eq!(body["message"], "Forbidden: Admins only");

        let (status, body) = render(ApiError::bad_request("missing field `file`")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_oversized_rejections_keep_413() {
        let (status, body) = render(rejected(
            StatusCode::PAYLOAD_TOO_LARGE,
            "length limit exceeded".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "payload_too_large");

        let (status, _) = render(rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE, "no".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
