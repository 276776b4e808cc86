//! Upload service
//!
//! Accepts a file for one of the known upload kinds, checks size and
//! type, and stores it under `<kind>/<uuid>-<sanitized filename>`. The
//! stored extension always matches the accepted content type, since
//! downloads are served with the type guessed from the key.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use hr_core::HrError;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::storage::{guess_content_type, Storage, StorageError};

const MAX_FILENAME_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// PDF documents: complaint evidence, budget justifications
    Document,
    /// Profile pictures and announcement images
    Image,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Document => "document",
            UploadKind::Image => "image",
        }
    }

    fn accepts(&self, content_type: &mime::Mime) -> bool {
        match self {
            UploadKind::Document => {
                content_type.essence_str() == mime::APPLICATION_PDF.essence_str()
            }
            // svg can carry script
            UploadKind::Image => {
                content_type.type_() == mime::IMAGE
                    && content_type.essence_str() != mime::IMAGE_SVG.essence_str()
            }
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadKind {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(UploadKind::Document),
            "image" => Ok(UploadKind::Image),
            other => Err(UploadError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unknown upload kind '{0}', expected document or image")]
    UnknownKind(String),
    #[error("File is empty")]
    Empty,
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },
    #[error("Content type {content_type} is not allowed for {kind} uploads")]
    InvalidContentType {
        kind: UploadKind,
        content_type: String,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<UploadError> for HrError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnknownKind(_) => HrError::invalid("kind", err.to_string()),
            UploadError::Storage(inner) => inner.into(),
            other => HrError::invalid("file", other.to_string()),
        }
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    pub key: String,
    pub content_type: String,
    pub size: u64,
    pub digest: String,
}

pub struct UploadService {
    storage: Arc<dyn Storage>,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(storage: Arc<dyn Storage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store an uploaded file.
    ///
    /// The content type comes from the client when it sent a specific
    /// one, otherwise from the file extension.
    #[instrument(skip(self, data), fields(storage = self.storage.name(), size = data.len()))]
    pub async fn upload(
        &self,
        kind: UploadKind,
        filename: &str,
        declared_type: Option<&str>,
        data: Bytes,
    ) -> Result<UploadedFile, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Empty);
        }
        if data.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: data.len(),
                max: self.max_bytes,
            });
        }

        let content_type = resolve_content_type(filename, declared_type);
        if !kind.accepts(&content_type) {
            return Err(UploadError::InvalidContentType {
                kind,
                content_type: content_type.to_string(),
            });
        }

        let key = format!(
            "{}/{}-{}",
            kind,
            Uuid::new_v4(),
            stored_filename(filename, &content_type)
        );
        let metadata = self.storage.put(&key, data).await?;

        info!(key = %key, kind = %kind, size = metadata.size, "File uploaded");

        Ok(UploadedFile {
            url: self.storage.url(&key),
            key,
            content_type: content_type.essence_str().to_string(),
            size: metadata.size,
            digest: metadata.digest,
        })
    }

    /// Read a stored file back, with the content type to serve it as
    pub async fn download(&self, key: &str) -> Result<(String, Bytes), StorageError> {
        let data = self.storage.get(key).await?;
        Ok((guess_content_type(key), data))
    }
}

fn resolve_content_type(filename: &str, declared: Option<&str>) -> mime::Mime {
    let declared = declared
        .and_then(|raw| raw.parse::<mime::Mime>().ok())
        .filter(|m| *m != mime::APPLICATION_OCTET_STREAM);

    declared.unwrap_or_else(|| mime_guess::from_path(filename).first_or_octet_stream())
}

/// Sanitized filename whose extension maps back to `content_type`
fn stored_filename(filename: &str, content_type: &mime::Mime) -> String {
    let sanitized = sanitize_filename(filename);
    let served_as = mime_guess::from_path(&sanitized).first();
    if served_as.is_some_and(|m| m.essence_str() == content_type.essence_str()) {
        return sanitized;
    }

    let stem = match sanitized.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => sanitized.as_str(),
    };
    format!("{}.{}", stem, extension_for(content_type))
}

fn extension_for(content_type: &mime::Mime) -> &'static str {
    match content_type.essence_str() {
        "application/pdf" => "pdf",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin"),
    }
}

/// Reduce a client supplied filename to a safe key segment.
///
/// Directory parts are dropped, anything outside `[A-Za-z0-9._-]` becomes
/// `_`, leading dots are stripped and the result is capped at 100 chars
/// with the extension kept.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return "file".to_string();
    }
    if cleaned.len() <= MAX_FILENAME_CHARS {
        return cleaned.to_string();
    }

    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() < 10 => {
            let keep = MAX_FILENAME_CHARS - ext.len() - 1;
            format!("{}.{}", &stem[..keep.min(stem.len())], ext)
        }
        _ => cleaned[..MAX_FILENAME_CHARS].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn service(max_bytes: usize) -> (UploadService, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (UploadService::new(storage.clone(), max_bytes), storage)
    }

    #[tokio::test]
    async fn test_upload_document() {
        let (uploads, storage) = service(1024);
        let uploaded = uploads
            .upload(
                UploadKind::Document,
                "Q3 budget.pdf",
                None,
                Bytes::from_static(b"%PDF-1.4"),
            )
            .await
            .unwrap();

        assert!(uploaded.key.starts_with("document/"));
        assert!(uploaded.key.ends_with("-Q3_budget.pdf"));
        assert_eq!(uploaded.url, format!("/uploads/{}", uploaded.key));
        assert_eq!(uploaded.content_type, "application/pdf");
        assert_eq!(uploaded.size, 8);
        assert_eq!(uploaded.digest.len(), 64);
        assert!(storage.exists(&uploaded.key).await.unwrap());

        let (content_type, data) = uploads.download(&uploaded.key).await.unwrap();
        assert_eq!(content_type, "application/pdf");
        assert_eq!(&data[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_document_must_be_pdf() {
        let (uploads, storage) = service(1024);
        let result = uploads
            .upload(UploadKind::Document, "notes.txt", None, Bytes::from_static(b"hi"))
            .await;

        assert!(matches!(result, Err(UploadError::InvalidContentType { .. })));
        assert_eq!(storage.len().await, 0);
    }

    #[tokio::test]
    async fn test_image_uses_declared_type() {
        let (uploads, _) = service(1024);
        let uploaded = uploads
            .upload(
                UploadKind::Image,
                "avatar",
                Some("image/jpeg"),
                Bytes::from_static(b"\xff\xd8\xff"),
            )
            .await
            .unwrap();
        assert_eq!(uploaded.content_type, "image/jpeg");

        let rejected = uploads
            .upload(
                UploadKind::Image,
                "avatar.png",
                Some("application/pdf"),
                Bytes::from_static(b"x"),
            )
            .await;
        assert!(rejected.is_err());
    }

    #[tokio::test]
    async fn test_extension_follows_accepted_type() {
        let (uploads, _) = service(1024);
        let uploaded = uploads
            .upload(
                UploadKind::Image,
                "evil.html",
                Some("image/png"),
                Bytes::from_static(b"<script>alert(1)</script>"),
            )
            .await
            .unwrap();

        assert!(uploaded.key.ends_with("-evil.png"), "{}", uploaded.key);
        let (content_type, _) = uploads.download(&uploaded.key).await.unwrap();
        assert_eq!(content_type, "image/png");

        let plain = uploads
            .upload(UploadKind::Image, "me.jpg", Some("image/jpeg"), Bytes::from_static(b"x"))
            .await
            .unwrap();
        assert!(plain.key.ends_with("-me.jpg"));
    }

    #[tokio::test]
    async fn test_svg_images_rejected() {
        let (uploads, _) = service(1024);
        let result = uploads
            .upload(
                UploadKind::Image,
                "logo.svg",
                None,
                Bytes::from_static(b"<svg onload=\"alert(1)\"/>"),
            )
            .await;
        assert!(matches!(result, Err(UploadError::InvalidContentType { .. })));
    }

    #[tokio::test]
    async fn test_size_limits() {
        let (uploads, _) = service(4);
        assert!(matches!(
            uploads
                .upload(UploadKind::Image, "a.png", None, Bytes::from_static(b"12345"))
                .await,
            Err(UploadError::TooLarge { size: 5, max: 4 })
        ));
        assert!(matches!(
            uploads
                .upload(UploadKind::Image, "a.png", None, Bytes::new())
                .await,
            Err(UploadError::Empty)
        ));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("document".parse::<UploadKind>().unwrap(), UploadKind::Document);
        assert_eq!("image".parse::<UploadKind>().unwrap(), UploadKind::Image);
        let err = "video".parse::<UploadKind>().unwrap_err();
        assert_eq!(HrError::from(err).status_code(), 422);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\jo\\CV (final).pdf"), "CV__final_.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("..."), "file");
        assert_eq!(sanitize_filename("résumé.pdf"), "r_sum_.pdf");

        let long = format!("{}.pdf", "a".repeat(300));
        let cleaned = sanitize_filename(&long);
        assert_eq!(cleaned.len(), MAX_FILENAME_CHARS);
        assert!(cleaned.ends_with(".pdf"));
    }
}
