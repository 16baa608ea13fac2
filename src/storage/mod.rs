//! Object storage collaborator.
//!
//! Documents are written to and read from an object store through the [`Storage`]
//! trait. Callers construct a concrete backend once and pass it (usually behind an
//! `Arc`) to whatever needs it. [`LocalStorage`] keeps objects on the local
//! filesystem and is what the binary and the tests use.

mod local;

pub use local::LocalStorage;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Whether the operation may succeed if simply tried again. Conflicts, bad paths,
    /// missing objects and configuration problems will not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UploadFailed(_) | Self::DownloadFailed(_) | Self::DeleteFailed(_) | Self::Io(_)
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Options sent along with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// MIME type recorded for the object
    pub content_type: String,
    /// Cache lifetime in seconds advertised to clients
    pub cache_control: u32,
    /// Overwrite an existing object at the same path
    pub upsert: bool,
}

impl UploadOptions {
    /// Options used for employee documents: one hour cache, never overwrite.
    #[must_use]
    pub fn for_document(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: 3600,
            upsert: false,
        }
    }
}

/// One entry returned by [`Storage::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// File name relative to the listed prefix
    pub name: String,
    /// Full path within the store
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// When the object was written
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// Paths are `/`-separated and relative to the store root, e.g.
/// `EMP001/cv_1718000000000.pdf`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Writes `data` at `path` and returns the stored path.
    async fn upload(&self, path: &str, data: Bytes, options: &UploadOptions)
    -> StorageResult<String>;

    /// Public URL for an object. Does not check that the object exists.
    fn public_url(&self, path: &str) -> String;

    /// Lists objects directly under `prefix`, newest first, at most `limit` entries.
    async fn list(&self, prefix: &str, limit: usize) -> StorageResult<Vec<StoredObject>>;

    /// Removes every object in `paths`.
    async fn remove(&self, paths: &[String]) -> StorageResult<()>;

    /// Reads an object back.
    async fn download(&self, path: &str) -> StorageResult<Bytes>;
}
