//! Portal settings loaded from `portal.toml`.
//!
//! Every field has a default matching the values the portal has always run with, so
//! an absent or partial file is valid. Sections:
//!
//! ```toml
//! [uploads]
//! max_file_bytes = 5242880
//! concurrency = 2
//! max_attempts = 3
//! backoff_base_ms = 1000
//! storage_root = "data/documents"
//! public_base_url = "http://localhost:8080/documents"
//!
//! [[uploads.document_types]]
//! id = "cv"
//! label = "CV/Resume"
//! accept = ".pdf,.doc,.docx"
//!
//! [leave]
//! disabled_types = ["annual"]
//! min_reason_chars = 10
//!
//! [advance]
//! cap_percent = 20
//! min_reason_chars = 10
//! ```

use crate::core::leave_type::LeaveType;
use crate::errors::{Error, Result};
use crate::upload::{DocumentType, RetryPolicy};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level structure of `portal.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Document upload pipeline settings
    pub uploads: UploadSettings,
    /// Leave application rules
    pub leave: LeaveSettings,
    /// Salary advance rules
    pub advance: AdvanceSettings,
}

/// Settings for the document upload pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Largest accepted file in bytes
    pub max_file_bytes: u64,
    /// Uploads allowed in flight at once
    pub concurrency: usize,
    /// Total attempts per file, including the first
    pub max_attempts: u32,
    /// Base backoff; attempt `n` waits `base * 2^n`
    pub backoff_base_ms: u64,
    /// Directory used by the local storage backend
    pub storage_root: String,
    /// URL prefix documents are served from
    pub public_base_url: String,
    /// Document catalogue offered to employees
    pub document_types: Vec<DocumentType>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: 5 * 1024 * 1024,
            concurrency: 2,
            max_attempts: 3,
            backoff_base_ms: 1000,
            storage_root: "data/documents".to_string(),
            public_base_url: "http://localhost:8080/documents".to_string(),
            document_types: DocumentType::default_catalog(),
        }
    }
}

impl UploadSettings {
    /// Retry policy derived from the attempt and backoff settings.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_base_ms))
    }
}

/// Leave application rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeaveSettings {
    /// Leave types that can never be submitted from the portal
    pub disabled_types: Vec<LeaveType>,
    /// Minimum length of the reason field
    pub min_reason_chars: usize,
}

impl Default for LeaveSettings {
    fn default() -> Self {
        Self {
            disabled_types: vec![LeaveType::Annual],
            min_reason_chars: 10,
        }
    }
}

/// Salary advance rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvanceSettings {
    /// Maximum advance as a percentage of basic salary
    pub cap_percent: u32,
    /// Minimum length of the reason field
    pub min_reason_chars: usize,
}

impl Default for AdvanceSettings {
    fn default() -> Self {
        Self {
            cap_percent: 20,
            min_reason_chars: 10,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading portal settings from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_settings(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from `path` when it exists, otherwise falls back to defaults.
///
/// # Errors
/// Returns an error only if the file exists but cannot be read or parsed
pub fn load_settings_or_default<P: AsRef<Path>>(path: P) -> Result<Settings> {
    if path.as_ref().exists() {
        load_settings(path)
    } else {
        tracing::info!(
            "No settings file at {:?}, using defaults",
            path.as_ref()
        );
        Ok(Settings::default())
    }
}

fn parse_settings(contents: &str) -> std::result::Result<Settings, toml::de::Error> {
    toml::from_str(contents)
}
