//! Storage backends

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use hr_core::HrError;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl From<StorageError> for HrError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => HrError::NotFound {
                entity: "file",
                field: "key",
                value: key,
            },
            StorageError::InvalidPath(key) => {
                HrError::invalid("key", format!("'{}' is not a valid file key", key))
            }
            StorageError::Io(e) => {
                tracing::error!(error = %e, "Storage IO failure");
                HrError::Internal("file storage unavailable".to_string())
            }
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// What the backend knows about a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub content_type: String,
    /// Hex encoded SHA-256
    pub digest: String,
}

impl FileMetadata {
    fn describe(key: &str, data: &[u8]) -> Self {
        Self {
            size: data.len() as u64,
            content_type: guess_content_type(key),
            digest: sha256_hex(data),
        }
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata>;

    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Deleting a missing key is not an error
    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public URL for a key
    fn url(&self, key: &str) -> String;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Files under a directory on local disk
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key below the root, refusing anything that could escape it
    fn resolve_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let plain = !key.is_empty()
            && !key.contains('\\')
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !plain {
            return Err(StorageError::InvalidPath(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    #[instrument(skip(self, data), fields(storage = "local"))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata> {
        let path = self.resolve_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let metadata = FileMetadata::describe(key, &data);

        let mut file = fs::File::create(&path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        debug!(path = ?path, size = metadata.size, "File stored");
        Ok(metadata)
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.resolve_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = ?path, "File deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.resolve_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// In-memory storage for tests
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Bytes>>,
    base_url: String,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            base_url: "/uploads".to_string(),
        }
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata> {
        let metadata = FileMetadata::describe(key, &data);
        self.files.write().await.insert(key.to_string(), data);
        Ok(metadata)
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.files
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.files.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.files.read().await.contains_key(key))
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn guess_content_type(key: &str) -> String {
    mime_guess::from_path(key).first_or_octet_stream().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> LocalStorage {
        let root = std::env::temp_dir().join(format!("hr-uploads-{}", uuid::Uuid::new_v4()));
        LocalStorage::new(root, "http://localhost:5000/uploads/")
    }

    #[tokio::test]
    async fn test_local_put_get_delete() {
        let storage = temp_storage();
        let data = Bytes::from_static(b"%PDF-1.4 quarterly budget");

        let meta = storage.put("document/budget.pdf", data.clone()).await.unwrap();
        assert_eq!(meta.size, data.len() as u64);
        assert_eq!(meta.content_type, "application/pdf");
        assert_eq!(meta.digest, sha256_hex(&data));

        assert_eq!(storage.get("document/budget.pdf").await.unwrap(), data);
        assert!(storage.exists("document/budget.pdf").await.unwrap());

        storage.delete("document/budget.pdf").await.unwrap();
        assert!(!storage.exists("document/budget.pdf").await.unwrap());
        storage.delete("document/budget.pdf").await.unwrap();

        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[tokio::test]
    async fn test_local_missing_file() {
        let storage = temp_storage();
        assert!(matches!(
            storage.get("image/missing.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let storage = temp_storage();
        for key in ["../../etc/passwd", "/etc/passwd", "image/../../x", "a\\b", "", "./x"] {
            assert!(
                matches!(storage.get(key).await, Err(StorageError::InvalidPath(_))),
                "{key} should be rejected"
            );
        }
    }

    #[test]
    fn test_url_joins_base() {
        let storage = temp_storage();
        assert_eq!(
            storage.url("image/a.png"),
            "http://localhost:5000/uploads/image/a.png"
        );
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        let meta = storage.put("image/a.png", Bytes::from_static(b"png")).await.unwrap();
        assert_eq!(meta.content_type, "image/png");
        assert_eq!(storage.len().await, 1);
        assert!(matches!(
            storage.get("image/b.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_storage_errors_map_to_http() {
        assert_eq!(HrError::from(StorageError::NotFound("k".into())).status_code(), 404);
        assert_eq!(HrError::from(StorageError::InvalidPath("..".into())).status_code(), 422);
    }
}
