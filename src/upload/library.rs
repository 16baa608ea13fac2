//! An employee's stored documents.

use super::document::{DocumentType, FileKind, find_document_type, format_file_size, parse_document_type};
use crate::{
    errors::{Error, Result},
    storage::Storage,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// Most documents listed for one employee.
pub const LIST_LIMIT: usize = 100;

/// A stored document as shown in the employee's document list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub name: String,
    pub path: String,
    /// Catalogue id parsed from the file name; `None` for files the portal did not name
    pub document_type: Option<String>,
    /// Catalogue label, or the file name when the type is unknown
    pub label: String,
    pub public_url: String,
    pub kind: FileKind,
    pub size: u64,
    pub formatted_size: String,
    pub created_at: DateTime<Utc>,
}

fn require_own_path(employee_number: &str, path: &str) -> Result<()> {
    let owned = path
        .strip_prefix(employee_number)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|name| !name.is_empty() && !name.contains('/'));
    if owned {
        Ok(())
    } else {
        Err(Error::Validation {
            field: "path".to_string(),
            message: format!("{path} does not belong to employee {employee_number}"),
        })
    }
}

/// Lists an employee's documents, newest first.
pub async fn list_documents<S: Storage + ?Sized>(
    storage: &S,
    employee_number: &str,
    catalog: &[DocumentType],
) -> Result<Vec<StoredDocument>> {
    let objects = storage.list(employee_number, LIST_LIMIT).await?;
    Ok(objects
        .into_iter()
        .map(|object| {
            let document_type = parse_document_type(&object.name).map(str::to_string);
            let label = document_type
                .as_deref()
                .and_then(|id| find_document_type(catalog, id))
                .map_or_else(|| object.name.clone(), |t| t.label.clone());
            StoredDocument {
                public_url: storage.public_url(&object.path),
                kind: FileKind::from_file_name(&object.name),
                formatted_size: format_file_size(object.size),
                size: object.size,
                created_at: object.created_at,
                document_type,
                label,
                name: object.name,
                path: object.path,
            }
        })
        .collect())
}

/// Catalogue types that already have a stored document. These are read-only in an
/// [`UploadBatch`](super::UploadBatch).
pub async fn committed_types<S: Storage + ?Sized>(
    storage: &S,
    employee_number: &str,
    catalog: &[DocumentType],
) -> Result<BTreeSet<String>> {
    Ok(list_documents(storage, employee_number, catalog)
        .await?
        .into_iter()
        .filter_map(|doc| doc.document_type)
        .filter(|id| find_document_type(catalog, id).is_some())
        .collect())
}

/// Reads one of the employee's documents.
pub async fn download_document<S: Storage + ?Sized>(
    storage: &S,
    employee_number: &str,
    path: &str,
) -> Result<Bytes> {
    require_own_path(employee_number, path)?;
    storage.download(path).await.map_err(Into::into)
}

/// Deletes one of the employee's documents.
#[instrument(skip(storage))]
pub async fn delete_document<S: Storage + ?Sized>(
    storage: &S,
    employee_number: &str,
    path: &str,
) -> Result<()> {
    require_own_path(employee_number, path)?;
    storage.remove(&[path.to_string()]).await?;
    info!("Document deleted");
    Ok(())
}
