//! Shared test utilities for the staff portal.
//!
//! Database setup with sensible defaults, request builders, and a scripted
//! in-memory storage backend for exercising the upload pipeline.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{LeaveType, eligibility::LeaveRequest, employee},
    entities,
    errors::Result,
    storage::{Storage, StorageError, StorageResult, StoredObject, UploadOptions},
    upload::document::parse_document_type,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test employee.
///
/// # Defaults
/// * `first_name`: `"Test"`
/// * `last_name`: the employee number, so the full name is `"Test {number}"`
pub async fn create_test_employee(
    db: &DatabaseConnection,
    employee_number: &str,
    branch: &str,
    basic_salary: f64,
) -> Result<entities::employee::Model> {
    employee::create_employee(db, employee_number, "Test", employee_number, branch, basic_salary)
        .await
}

/// A leave request for today with a valid reason.
pub fn leave_request(
    employee_number: &str,
    employee_name: &str,
    branch: &str,
    leave_type: LeaveType,
) -> LeaveRequest {
    let today = Utc::now().date_naive();
    LeaveRequest {
        employee_number: employee_number.to_string(),
        employee_name: employee_name.to_string(),
        branch: branch.to_string(),
        leave_type,
        start_date: today,
        end_date: today,
        reason: "Family commitments upcountry".to_string(),
    }
}

/// In-memory storage whose failures are scripted per document type.
///
/// Tracks how many uploads run at once so tests can assert the concurrency bound.
#[derive(Debug, Default)]
pub struct ScriptedStorage {
    latency: Duration,
    /// Remaining failures per document type; `usize::MAX` fails forever
    failures: Mutex<HashMap<String, usize>>,
    attempts: Mutex<HashMap<String, usize>>,
    objects: Mutex<BTreeMap<String, Bytes>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Scripted failures leave half the file behind instead of nothing
    keep_partial_writes: AtomicBool,
}

impl ScriptedStorage {
    /// Every upload takes `latency` before it settles.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// The next `times` uploads of `document_type` fail.
    pub fn fail_times(&self, document_type: &str, times: usize) {
        self.failures
            .lock()
            .unwrap()
            .insert(document_type.to_string(), times);
    }

    /// Every upload of `document_type` fails.
    pub fn fail_always(&self, document_type: &str) {
        self.fail_times(document_type, usize::MAX);
    }

    /// Scripted failures behave like a backend that does not clean up after itself.
    pub fn keep_partial_writes(&self) {
        self.keep_partial_writes.store(true, Ordering::SeqCst);
    }

    /// Contents stored at `path`.
    pub fn object(&self, path: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(path).cloned()
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Upload calls made for `document_type`, successful or not.
    pub fn attempts_for(&self, document_type: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .get(document_type)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of uploads observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Paths stored so far.
    pub fn stored(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    fn should_fail(&self, document_type: &str) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(document_type) {
            Some(0) | None => false,
            Some(&mut usize::MAX) => true,
            Some(remaining) => {
                *remaining -= 1;
                true
            }
        }
    }
}

#[async_trait]
impl Storage for ScriptedStorage {
    async fn upload(&self, path: &str, data: Bytes, options: &UploadOptions) -> StorageResult<String> {
        let name = path.rsplit_once('/').map_or(path, |(_, name)| name);
        let document_type = parse_document_type(name).unwrap_or(name).to_string();
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(document_type.clone())
            .or_default() += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if !options.upsert && self.objects.lock().unwrap().contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        if self.should_fail(&document_type) {
            if self.keep_partial_writes.load(Ordering::SeqCst) {
                let partial = data.slice(..data.len() / 2);
                self.objects.lock().unwrap().insert(path.to_string(), partial);
            }
            return Err(StorageError::UploadFailed(format!("{path}: scripted failure")));
        }
        self.objects.lock().unwrap().insert(path.to_string(), data);
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{path}")
    }

    async fn list(&self, prefix: &str, limit: usize) -> StorageResult<Vec<StoredObject>> {
        let prefix = format!("{}/", prefix.trim_matches('/'));
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .filter_map(|(path, data)| {
                let name = path.strip_prefix(&prefix)?;
                Some(StoredObject {
                    name: name.to_string(),
                    path: path.clone(),
                    size: data.len() as u64,
                    created_at: Utc::now(),
                })
            })
            .take(limit)
            .collect())
    }

    async fn remove(&self, paths: &[String]) -> StorageResult<()> {
        let mut objects = self.objects.lock().unwrap();
        for path in paths {
            objects
                .remove(path)
                .ok_or_else(|| StorageError::NotFound(path.clone()))?;
        }
        Ok(())
    }

    async fn download(&self, path: &str) -> StorageResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}
