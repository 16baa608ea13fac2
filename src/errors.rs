//! Unified error types for the staff portal core.
//!
//! Validation failures (bad files, malformed amounts, ineligible submissions) are
//! raised before any storage or database call is made. Collaborator failures are
//! wrapped through the `#[from]` conversions.

use crate::storage::StorageError;
use thiserror::Error;

/// All errors surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The database collaborator returned an error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Local I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage collaborator returned an error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// An amount field was not a positive finite number.
    #[error("Invalid amount: '{input}' must be a positive number")]
    InvalidAmount {
        /// The raw input as typed
        input: String,
    },

    /// A form field failed local validation.
    #[error("{field}: {message}")]
    Validation {
        /// Field name shown to the user
        field: String,
        /// Validation message
        message: String,
    },

    /// The submission was rejected by the monthly eligibility rules.
    #[error("Not eligible: {reason}")]
    NotEligible {
        /// Human-readable blocking reason
        reason: String,
    },

    /// The document type is not part of the configured catalogue.
    #[error("Unknown document type '{document_type}'")]
    UnknownDocumentType {
        /// Requested type id
        document_type: String,
    },

    /// A file for this document type has already been committed.
    #[error("{label} has already been uploaded")]
    AlreadyUploaded {
        /// Label of the document type
        label: String,
    },

    /// The file matches none of the accept rules for its type.
    #[error("Invalid file type. Accepted: {accepted}")]
    InvalidFileType {
        /// The accept list as configured
        accepted: String,
    },

    /// The file exceeds the configured size cap.
    #[error("File size too large. Max {max_display} allowed.")]
    FileTooLarge {
        /// Size of the rejected file in bytes
        size: u64,
        /// Cap formatted for display
        max_display: String,
    },

    /// No employee with this number exists.
    #[error("Employee '{employee_number}' not found")]
    EmployeeNotFound {
        /// Employee number that was looked up
        employee_number: String,
    },

    /// No application with this id exists.
    #[error("Application {id} not found")]
    ApplicationNotFound {
        /// Application id
        id: i64,
    },

    /// The requested status change is not allowed from the current status.
    #[error("Cannot move application from '{from}' to '{to}'")]
    InvalidStatusTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
