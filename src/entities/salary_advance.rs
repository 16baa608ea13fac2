//! Salary advance entity - A request to be paid part of the month's salary early.
//!
//! Decision timestamps are filled in as the application moves through
//! `pending -> approved -> paid` (or `rejected` / `cancelled`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Salary advance database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salary_advances")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee number of the requester
    pub employee_number: String,
    /// Requester's display name
    pub employee_name: String,
    /// Requester's branch
    pub branch: String,
    /// Amount requested in whole currency units
    pub amount_requested: f64,
    /// Free-text reason
    pub reason: String,
    /// Application status: `"pending"`, `"approved"`, `"rejected"`, `"paid"`, `"cancelled"`
    pub status: String,
    /// When the application was submitted
    pub submitted_at: DateTimeUtc,
    /// When the status last changed
    pub last_updated: DateTimeUtc,
    /// When an administrator approved the advance
    pub approved_at: Option<DateTimeUtc>,
    /// When an administrator rejected the advance
    pub rejected_at: Option<DateTimeUtc>,
    /// When the advance was paid out
    pub paid_at: Option<DateTimeUtc>,
}

/// `SalaryAdvance` has no modelled relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
