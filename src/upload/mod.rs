//! Employee document uploads.
//!
//! - [`document`]: the document catalogue, accept rules and path naming
//! - [`task`]: per-document status and its transition function
//! - [`retry`]: backoff with cancellation
//! - [`pipeline`]: the upload batch that ties them together
//! - [`library`]: listing, downloading and deleting stored documents

pub mod document;
pub mod library;
pub mod pipeline;
pub mod retry;
pub mod task;

pub use document::{DocumentType, FileKind, format_file_size};
pub use library::{StoredDocument, committed_types, delete_document, download_document, list_documents};
pub use pipeline::{BatchHandle, TaskReport, UploadBatch, UploadSummary, format_upload_summary};
pub use retry::{RetryOutcome, RetryPolicy, retry, retry_if};
pub use task::{PendingFile, TaskEvent, TaskStatus, UploadTask};
