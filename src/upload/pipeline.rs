//! Document upload batch.
//!
//! An [`UploadBatch`] belongs to one employee. Files are selected per document type,
//! validated locally, then uploaded in chunks of at most `concurrency` transfers;
//! each chunk settles completely before the next one starts. Every transfer retries
//! with exponential backoff and can be cancelled through a [`BatchHandle`] while it
//! is in flight.

use super::{
    document::{DocumentType, build_document_path, find_document_type, format_file_size},
    retry::{RetryOutcome, RetryPolicy, retry_if},
    task::{PendingFile, TaskEvent, TaskStatus, UploadTask},
};
use crate::{
    config::UploadSettings,
    errors::{Error, Result},
    storage::{Storage, StorageError, UploadOptions},
};
use chrono::Utc;
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

type Board = BTreeMap<String, UploadTask>;

fn lock(board: &Mutex<Board>) -> MutexGuard<'_, Board> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Applies `event` to the task for `document_type`, replacing its entry.
fn dispatch(board: &Mutex<Board>, document_type: &str, event: &TaskEvent) -> TaskStatus {
    let mut tasks = lock(board);
    let task = tasks
        .remove(document_type)
        .unwrap_or_else(|| UploadTask::new(document_type))
        .apply(event);
    let status = task.status.clone();
    tasks.insert(document_type.to_string(), task);
    status
}

/// Cloneable view of a batch's task board, usable while an upload is running.
#[derive(Debug, Clone)]
pub struct BatchHandle {
    board: Arc<Mutex<Board>>,
}

impl BatchHandle {
    /// Cancels the in-flight transfer for `document_type`. Returns `false` if that
    /// document is not currently being uploaded.
    pub fn cancel(&self, document_type: &str) -> bool {
        let tasks = lock(&self.board);
        match tasks.get(document_type).and_then(|t| t.cancel.as_ref()) {
            Some(token) => {
                token.cancel();
                info!(document_type, "Upload cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Cancels every in-flight transfer and returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let tasks = lock(&self.board);
        let mut cancelled = 0;
        for token in tasks.values().filter_map(|t| t.cancel.as_ref()) {
            token.cancel();
            cancelled += 1;
        }
        if cancelled > 0 {
            info!(cancelled, "Cancellation requested for all uploads");
        }
        cancelled
    }

    /// Current status of one document.
    #[must_use]
    pub fn status(&self, document_type: &str) -> Option<TaskStatus> {
        lock(&self.board)
            .get(document_type)
            .map(|t| t.status.clone())
    }

    /// Snapshot of every task.
    #[must_use]
    pub fn snapshot(&self) -> Vec<UploadTask> {
        lock(&self.board).values().cloned().collect()
    }

    /// Number of transfers currently uploading or waiting to retry.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        lock(&self.board)
            .values()
            .filter(|t| t.status.is_in_flight())
            .count()
    }
}

/// Final state of one document after an upload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub document_type: String,
    pub status: TaskStatus,
    /// Attempts made during this run
    pub attempts: u32,
    /// Storage path written on success
    pub path: Option<String>,
}

/// Aggregate result of [`UploadBatch::upload`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// One report per document attempted, in catalogue order
    pub reports: Vec<TaskReport>,
}

impl UploadSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.cancelled == 0 && self.succeeded > 0
    }
}

/// Notification text for an upload run.
#[must_use]
pub fn format_upload_summary(summary: &UploadSummary) -> String {
    if summary.is_empty() {
        return "No documents to upload".to_string();
    }
    if summary.all_succeeded() {
        return "All documents uploaded successfully!".to_string();
    }

    let mut text = format!(
        "{} uploaded, {} failed, {} cancelled.",
        summary.succeeded, summary.failed, summary.cancelled
    );
    if summary.failed > 0 {
        text.push_str(" Some documents failed to upload. Please check the errors and try again.");
    }
    text
}

struct Job {
    document_type: String,
    file: PendingFile,
    path: String,
}

/// Upload state for one employee's documents.
pub struct UploadBatch<S: Storage + ?Sized> {
    storage: Arc<S>,
    employee_number: String,
    catalog: Vec<DocumentType>,
    max_file_bytes: u64,
    concurrency: usize,
    retry_policy: RetryPolicy,
    committed: BTreeSet<String>,
    board: Arc<Mutex<Board>>,
}

impl<S: Storage + ?Sized> UploadBatch<S> {
    /// Creates an empty batch.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the employee number is empty or contains `/`.
    pub fn new(storage: Arc<S>, employee_number: &str, settings: &UploadSettings) -> Result<Self> {
        let employee_number = employee_number.trim();
        if employee_number.is_empty() || employee_number.contains('/') {
            return Err(Error::Validation {
                field: "employee_number".to_string(),
                message: "must be non-empty and must not contain '/'".to_string(),
            });
        }

        Ok(Self {
            storage,
            employee_number: employee_number.to_string(),
            catalog: settings.document_types.clone(),
            max_file_bytes: settings.max_file_bytes,
            concurrency: settings.concurrency.max(1),
            retry_policy: settings.retry_policy(),
            committed: BTreeSet::new(),
            board: Arc::new(Mutex::new(Board::new())),
        })
    }

    /// Marks document types that already have a stored file (see
    /// [`committed_types`](super::library::committed_types)).
    #[must_use]
    pub fn with_committed<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.committed.extend(types.into_iter().map(Into::into));
        self
    }

    /// Handle for cancelling and observing transfers from elsewhere.
    #[must_use]
    pub fn handle(&self) -> BatchHandle {
        BatchHandle {
            board: Arc::clone(&self.board),
        }
    }

    #[must_use]
    pub fn employee_number(&self) -> &str {
        &self.employee_number
    }

    #[must_use]
    pub fn is_committed(&self, document_type: &str) -> bool {
        self.committed.contains(document_type)
    }

    /// Snapshot of one task.
    #[must_use]
    pub fn task(&self, document_type: &str) -> Option<UploadTask> {
        lock(&self.board).get(document_type).cloned()
    }

    /// Document types with a file waiting to be uploaded, in catalogue order.
    #[must_use]
    pub fn pending_types(&self) -> Vec<String> {
        let tasks = lock(&self.board);
        self.catalog
            .iter()
            .filter(|t| !self.committed.contains(&t.id))
            .filter(|t| tasks.get(&t.id).is_some_and(UploadTask::is_pending))
            .map(|t| t.id.clone())
            .collect()
    }

    fn document_type(&self, document_type: &str) -> Result<&DocumentType> {
        find_document_type(&self.catalog, document_type).ok_or_else(|| {
            Error::UnknownDocumentType {
                document_type: document_type.to_string(),
            }
        })
    }

    /// Validates `file` for `document_type` and stores it as pending.
    ///
    /// A committed type is refused without touching its task. Other refusals record
    /// the message as the task's error status and keep any previously selected file.
    pub fn select_file(&self, document_type: &str, file: PendingFile) -> Result<()> {
        let doc = self.document_type(document_type)?;
        if self.committed.contains(document_type) {
            return Err(Error::AlreadyUploaded {
                label: doc.label.clone(),
            });
        }
        if lock(&self.board)
            .get(document_type)
            .is_some_and(|t| t.status.is_in_flight())
        {
            return Err(Error::Validation {
                field: doc.label.clone(),
                message: "upload already in progress".to_string(),
            });
        }

        let rejection = if !doc.accepts(&file.name, &file.content_type) {
            Some(Error::InvalidFileType {
                accepted: doc.accept.clone(),
            })
        } else if file.size() > self.max_file_bytes {
            Some(Error::FileTooLarge {
                size: file.size(),
                max_display: format_file_size(self.max_file_bytes),
            })
        } else {
            None
        };

        if let Some(error) = rejection {
            dispatch(
                &self.board,
                document_type,
                &TaskEvent::Rejected {
                    reason: error.to_string(),
                },
            );
            return Err(error);
        }

        let mut tasks = lock(&self.board);
        let mut task = tasks
            .remove(document_type)
            .unwrap_or_else(|| UploadTask::new(document_type))
            .apply(&TaskEvent::Selected);
        task.file = Some(file);
        task.target_path = None;
        tasks.insert(document_type.to_string(), task);
        Ok(())
    }

    /// Drag-and-drop entry point: the first dropped file goes through
    /// [`Self::select_file`]. Dropping nothing is a no-op.
    pub fn drop_files(&self, document_type: &str, files: Vec<PendingFile>) -> Result<()> {
        match files.into_iter().next() {
            Some(file) => self.select_file(document_type, file),
            None => Ok(()),
        }
    }

    /// Removes the pending file for `document_type`.
    pub fn remove_file(&self, document_type: &str) -> Result<()> {
        let doc = self.document_type(document_type)?;
        if self.committed.contains(document_type) {
            return Err(Error::AlreadyUploaded {
                label: doc.label.clone(),
            });
        }

        let mut tasks = lock(&self.board);
        if let Some(task) = tasks.remove(document_type) {
            if task.status.is_in_flight() {
                tasks.insert(document_type.to_string(), task);
                return Err(Error::Validation {
                    field: doc.label.clone(),
                    message: "upload already in progress".to_string(),
                });
            }
            let mut task = task.apply(&TaskEvent::Removed);
            task.file = None;
            tasks.insert(document_type.to_string(), task);
        }
        Ok(())
    }

    /// Drops every pending file that has not been committed.
    pub fn reset(&self) {
        let mut tasks = lock(&self.board);
        tasks.retain(|_, task| {
            task.status.is_in_flight() || matches!(task.status, TaskStatus::Success { .. })
        });
    }

    /// Uploads every pending, uncommitted file.
    ///
    /// Successful documents become committed and their pending file is cleared;
    /// failed and cancelled ones keep their file so they can be resubmitted.
    #[instrument(skip(self), fields(employee = %self.employee_number))]
    pub async fn upload(&mut self) -> UploadSummary {
        let jobs = self.collect_jobs();
        if jobs.is_empty() {
            return UploadSummary::default();
        }
        info!(count = jobs.len(), concurrency = self.concurrency, "Starting document upload");

        let mut summary = UploadSummary::default();
        for chunk in jobs.chunks(self.concurrency) {
            let tokens: Vec<CancellationToken> = {
                let mut tasks = lock(&self.board);
                chunk
                    .iter()
                    .map(|job| {
                        let token = CancellationToken::new();
                        if let Some(task) = tasks.get_mut(&job.document_type) {
                            task.cancel = Some(token.clone());
                            task.target_path = Some(job.path.clone());
                        }
                        token
                    })
                    .collect()
            };

            let reports = join_all(
                chunk
                    .iter()
                    .zip(tokens)
                    .map(|(job, token)| self.transfer(job, token)),
            )
            .await;

            for report in reports {
                match report.status {
                    TaskStatus::Success { .. } => {
                        summary.succeeded += 1;
                        self.committed.insert(report.document_type.clone());
                    }
                    TaskStatus::Cancelled => summary.cancelled += 1,
                    _ => summary.failed += 1,
                }
                summary.reports.push(report);
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "Document upload finished"
        );
        summary
    }

    fn collect_jobs(&self) -> Vec<Job> {
        let tasks = lock(&self.board);
        let stamp = Utc::now().timestamp_millis();
        self.catalog
            .iter()
            .filter(|t| !self.committed.contains(&t.id))
            .filter_map(|t| {
                let task = tasks.get(&t.id)?;
                let file = task.file.clone()?;
                Some(Job {
                    path: build_document_path(&self.employee_number, &t.id, stamp, &file.name),
                    document_type: t.id.clone(),
                    file,
                })
            })
            .collect()
    }

    async fn transfer(&self, job: &Job, cancel: CancellationToken) -> TaskReport {
        let options = UploadOptions::for_document(job.file.content_type.clone());
        let board = &self.board;
        let document_type = job.document_type.as_str();

        let outcome = retry_if(
            &self.retry_policy,
            &cancel,
            |_attempt| {
                dispatch(board, document_type, &TaskEvent::Started);
                let storage = Arc::clone(&self.storage);
                let data = job.file.data.clone();
                let path = job.path.clone();
                let options = options.clone();
                async move { storage.upload(&path, data, &options).await }
            },
            StorageError::is_retryable,
            |attempt, error, delay| {
                warn!(document_type, attempt, ?delay, %error, "Upload attempt failed");
                dispatch(board, document_type, &TaskEvent::RetryScheduled { attempt });
            },
        )
        .await;

        let attempts = outcome.attempts();
        let (event, path) = match outcome {
            RetryOutcome::Success { value, .. } => {
                let url = self.storage.public_url(&value);
                (TaskEvent::Succeeded { url }, Some(value))
            }
            RetryOutcome::Failed { error, .. } => (
                TaskEvent::Failed {
                    reason: error.to_string(),
                },
                None,
            ),
            RetryOutcome::Cancelled { .. } => (TaskEvent::Cancelled, None),
        };

        let status = {
            let mut tasks = lock(board);
            let mut task = tasks
                .remove(document_type)
                .unwrap_or_else(|| UploadTask::new(document_type));
            if attempts == 0 {
                // Cancelled before the first attempt: the task never left its old
                // status, so force it through `Started` to record the cancellation.
                task = task.apply(&TaskEvent::Started);
            }
            task = task.apply(&event);
            if matches!(task.status, TaskStatus::Success { .. }) {
                task.file = None;
            }
            task.cancel = None;
            let status = task.status.clone();
            tasks.insert(document_type.to_string(), task);
            status
        };

        match &status {
            TaskStatus::Success { .. } => info!(document_type, attempts, "Document uploaded"),
            TaskStatus::Cancelled => info!(document_type, attempts, "Document upload cancelled"),
            _ => warn!(document_type, attempts, "Document upload failed"),
        }

        TaskReport {
            document_type: document_type.to_string(),
            status,
            attempts,
            path,
        }
    }
}
