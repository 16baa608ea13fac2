//! Per-document upload state.
//!
//! Status changes go through [`TaskStatus::apply`], a pure transition function, so the
//! pipeline never edits a status in place and every transition can be tested alone.

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

/// A file chosen by the employee, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// Original file name, used for the extension
    pub name: String,
    /// MIME type reported by the client
    pub content_type: String,
    /// File contents
    pub data: Bytes,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Where a task is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Idle,
    /// A transfer attempt is running
    Uploading,
    Retrying {
        /// The attempt that just failed
        attempt: u32,
    },
    Success {
        /// Public URL of the stored file
        url: String,
    },
    Error {
        /// Last error message
        reason: String,
    },
    Cancelled,
}

/// Something that happened to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// A valid file was selected
    Selected,
    /// A file was refused by validation
    Rejected { reason: String },
    /// The pending file was removed
    Removed,
    /// A transfer attempt started
    Started,
    /// An attempt failed and another one is scheduled
    RetryScheduled { attempt: u32 },
    /// The file was stored
    Succeeded { url: String },
    /// The last attempt failed
    Failed { reason: String },
    /// The transfer was cancelled
    Cancelled,
}

impl TaskStatus {
    /// Next status after `event`. Events that make no sense in the current status
    /// leave it unchanged; a committed (`Success`) task never leaves `Success`.
    #[must_use]
    pub fn apply(&self, event: &TaskEvent) -> Self {
        match (self, event) {
            (Self::Success { .. }, _)
            | (
                Self::Uploading | Self::Retrying { .. },
                TaskEvent::Selected | TaskEvent::Removed | TaskEvent::Rejected { .. },
            ) => self.clone(),
            (_, TaskEvent::Selected | TaskEvent::Removed) => Self::Idle,
            (_, TaskEvent::Rejected { reason }) => Self::Error {
                reason: reason.clone(),
            },
            (_, TaskEvent::Started) => Self::Uploading,
            (Self::Uploading, TaskEvent::RetryScheduled { attempt }) => Self::Retrying {
                attempt: *attempt,
            },
            (Self::Uploading, TaskEvent::Succeeded { url }) => Self::Success { url: url.clone() },
            (Self::Uploading | Self::Retrying { .. }, TaskEvent::Failed { reason }) => {
                Self::Error {
                    reason: reason.clone(),
                }
            }
            (Self::Uploading | Self::Retrying { .. }, TaskEvent::Cancelled) => {
                Self::Cancelled
            }
            _ => self.clone(),
        }
    }

    /// Whether a transfer for this task is running or waiting to retry.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Uploading | Self::Retrying { .. })
    }

    /// Message shown next to the document.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Idle => None,
            Self::Uploading => Some("Uploading...".to_string()),
            Self::Retrying { attempt } => Some(format!("Attempt {attempt} failed, retrying...")),
            Self::Success { .. } => Some("Upload successful!".to_string()),
            Self::Error { reason } => Some(reason.clone()),
            Self::Cancelled => Some("Upload cancelled".to_string()),
        }
    }
}

/// One document slot in an upload batch.
#[derive(Debug, Clone, Default)]
pub struct UploadTask {
    /// Document type id this task belongs to
    pub document_type: String,
    /// File waiting to be uploaded; cleared once it is stored
    pub file: Option<PendingFile>,
    /// Storage path of the current or last transfer
    pub target_path: Option<String>,
    /// Current status
    pub status: TaskStatus,
    /// Retries scheduled since the file was selected
    pub retries: u32,
    /// Cancels the transfer; present only while it is in flight
    pub cancel: Option<CancellationToken>,
}

impl UploadTask {
    #[must_use]
    pub fn new(document_type: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            ..Self::default()
        }
    }

    /// Returns the task after `event`.
    #[must_use]
    pub fn apply(mut self, event: &TaskEvent) -> Self {
        self.status = self.status.apply(event);
        match event {
            TaskEvent::Selected | TaskEvent::Removed => self.retries = 0,
            TaskEvent::RetryScheduled { .. } if matches!(self.status, TaskStatus::Retrying { .. }) => {
                self.retries += 1;
            }
            _ => {}
        }
        if !self.status.is_in_flight() {
            self.cancel = None;
        }
        self
    }

    /// Percent complete. Storage writes are atomic from the caller's side, so this is
    /// either 0 or 100.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        match self.status {
            TaskStatus::Success { .. } => 100,
            _ => 0,
        }
    }

    /// Last status message.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.status.message()
    }

    /// Whether a file is waiting to be uploaded.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.file.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploading() -> TaskStatus {
        TaskStatus::Idle.apply(&TaskEvent::Started)
    }

    #[test]
    fn test_happy_path() {
        let status = uploading();
        assert_eq!(status, TaskStatus::Uploading);
        assert_eq!(status.apply(&TaskEvent::Started), TaskStatus::Uploading);
        let status = status.apply(&TaskEvent::Succeeded { url: "u".into() });
        assert_eq!(status, TaskStatus::Success { url: "u".into() });
    }

    #[test]
    fn test_retry_then_fail() {
        let status = uploading().apply(&TaskEvent::RetryScheduled { attempt: 1 });
        assert_eq!(status, TaskStatus::Retrying { attempt: 1 });
        let status = status.apply(&TaskEvent::Started);
        assert!(status.is_in_flight());
        let status = status.apply(&TaskEvent::Failed {
            reason: "boom".into(),
        });
        assert_eq!(status.message().as_deref(), Some("boom"));
    }

    #[test]
    fn test_success_is_terminal() {
        let done = TaskStatus::Success { url: "u".into() };
        for event in [
            TaskEvent::Selected,
            TaskEvent::Started,
            TaskEvent::Cancelled,
            TaskEvent::Rejected {
                reason: "x".into(),
            },
        ] {
            assert_eq!(done.apply(&event), done);
        }
    }

    #[test]
    fn test_cancel_only_affects_in_flight() {
        assert_eq!(TaskStatus::Idle.apply(&TaskEvent::Cancelled), TaskStatus::Idle);
        assert_eq!(uploading().apply(&TaskEvent::Cancelled), TaskStatus::Cancelled);
        let retrying = TaskStatus::Retrying { attempt: 2 };
        assert_eq!(retrying.apply(&TaskEvent::Cancelled), TaskStatus::Cancelled);
    }

    #[test]
    fn test_failed_and_cancelled_tasks_can_restart() {
        let failed = TaskStatus::Error {
            reason: "x".into(),
        };
        assert!(failed.apply(&TaskEvent::Started).is_in_flight());
        assert!(TaskStatus::Cancelled.apply(&TaskEvent::Started).is_in_flight());
    }

    #[test]
    fn test_progress_is_complete_only_after_success() {
        let task = UploadTask::new("cv").apply(&TaskEvent::Started);
        assert_eq!(task.progress(), 0);
        let task = task.apply(&TaskEvent::Succeeded { url: "u".into() });
        assert_eq!(task.progress(), 100);
    }

    #[test]
    fn test_task_counts_retries_and_drops_token() {
        let mut task = UploadTask::new("cv");
        task.cancel = Some(CancellationToken::new());
        let task = task
            .apply(&TaskEvent::Started)
            .apply(&TaskEvent::RetryScheduled { attempt: 1 })
            .apply(&TaskEvent::Started)
            .apply(&TaskEvent::RetryScheduled { attempt: 2 });
        assert_eq!(task.retries, 2);
        assert!(task.cancel.is_some());

        let task = task.apply(&TaskEvent::Failed {
            reason: "down".into(),
        });
        assert!(task.cancel.is_none());
        assert_eq!(task.progress(), 0);

        let task = task.apply(&TaskEvent::Selected);
        assert_eq!(task.retries, 0);
        assert_eq!(task.status, TaskStatus::Idle);
    }
}
