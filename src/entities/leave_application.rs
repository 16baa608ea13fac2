//! Leave application entity - One leave request submitted from the staff portal.
//!
//! `submitted_at` is the timestamp the monthly eligibility window is applied to.
//! `leave_type` and `status` hold the lowercase names of
//! [`LeaveType`](crate::core::LeaveType) and
//! [`ApplicationStatus`](crate::core::ApplicationStatus).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Leave application database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_applications")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee number of the requester
    pub employee_number: String,
    /// Requester's display name, kept so blocking reasons can name colleagues
    pub employee_name: String,
    /// Branch the requester belonged to when applying
    pub branch: String,
    /// Leave type: `"monthly"`, `"annual"`, `"sick"`, ...
    pub leave_type: String,
    /// First day of leave
    pub start_date: Date,
    /// Last day of leave (inclusive)
    pub end_date: Date,
    /// Free-text reason
    pub reason: String,
    /// Application status: `"pending"`, `"approved"`, `"rejected"`, `"cancelled"`
    pub status: String,
    /// When the application was submitted
    pub submitted_at: DateTimeUtc,
}

/// `LeaveApplication` has no modelled relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
