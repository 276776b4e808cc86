//! File upload and download handlers

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use hr_attachments::UploadKind;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

const FILE_FIELD: &str = "file";

/// POST /api/uploads/:kind
///
/// Multipart body with a single `file` field. `kind` is `document` or
/// `image`.
pub async fn upload(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let kind: UploadKind = kind.parse()?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let declared_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        let stored = state
            .services
            .uploads
            .upload(kind, &filename, declared_type.as_deref(), data)
            .await?;
        debug!(user_id = user.id, key = %stored.key, "File uploaded");
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(ApiError::bad_request("Multipart field `file` is required"))
}

/// GET /uploads/*key
pub async fn download(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let (content_type, data) = state.services.uploads.download(&key).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        data,
    ))
}
