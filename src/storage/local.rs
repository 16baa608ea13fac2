use super::{Storage, StorageError, StorageResult, StoredObject, UploadOptions};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Local filesystem storage implementation
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new `LocalStorage` instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored documents (e.g. "data/documents")
    /// * `base_url` - Base URL the documents are served from
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::Config(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self {
            base_path,
            base_url,
        })
    }

    /// Root directory objects are written under.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Maps a storage path onto the filesystem, refusing anything that could escape
    /// the base directory.
    fn resolve(&self, storage_path: &str) -> StorageResult<PathBuf> {
        let trimmed = storage_path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(self.base_path.clone());
        }
        if storage_path.starts_with('/')
            || trimmed.contains('\\')
            || trimmed.split('/').any(|part| part.is_empty() || part == "." || part == "..")
        {
            return Err(StorageError::InvalidPath(storage_path.to_string()));
        }
        Ok(self.base_path.join(trimmed))
    }
}

/// Writes `data` through `writer`. If the write fails, the partial file at `target` is
/// removed so the next attempt can create it again.
async fn write_or_discard<W>(writer: &mut W, target: &Path, data: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(data).await?;
        writer.flush().await
    }
    .await;

    if written.is_err() {
        if let Err(e) = fs::remove_file(target).await {
            warn!(path = %target.display(), error = %e, "Failed to remove partial upload");
        }
    }
    written
}

fn created_at(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_or_else(|_| Utc::now(), DateTime::<Utc>::from)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut open = fs::OpenOptions::new();
        open.write(true);
        if options.upsert {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }

        let mut file = open.open(&target).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
            _ => StorageError::UploadFailed(format!("{path}: {e}")),
        })?;
        write_or_discard(&mut file, &target, &data)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{path}: {e}")))?;

        debug!(
            path,
            bytes = data.len(),
            content_type = %options.content_type,
            "Stored object"
        );
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn list(&self, prefix: &str, limit: usize) -> StorageResult<Vec<StoredObject>> {
        let dir = self.resolve(prefix)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = prefix.trim_matches('/');
        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            objects.push(StoredObject {
                name,
                path,
                size: metadata.len(),
                created_at: created_at(&metadata),
            });
        }

        objects.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        objects.truncate(limit);
        Ok(objects)
    }

    async fn remove(&self, paths: &[String]) -> StorageResult<()> {
        for path in paths {
            let target = self.resolve(path)?;
            fs::remove_file(&target).await.map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound(path.clone()),
                _ => StorageError::DeleteFailed(format!("{path}: {e}")),
            })?;
        }
        Ok(())
    }

    async fn download(&self, path: &str) -> StorageResult<Bytes> {
        let target = self.resolve(path)?;
        fs::read(&target)
            .await
            .map(Bytes::from)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
                _ => StorageError::DownloadFailed(format!("{path}: {e}")),
            })
    }
}
