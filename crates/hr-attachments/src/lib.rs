//! # hr-attachments
//!
//! Uploads for complaint evidence, budget request documents, profile
//! pictures and announcement images.
//!
//! Files are written through a [`Storage`] backend and addressed by key;
//! the public URL is the configured base URL joined with the key.

pub mod storage;
pub mod upload;

pub use storage::{FileMetadata, LocalStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use upload::{sanitize_filename, UploadError, UploadKind, UploadService, UploadedFile};
