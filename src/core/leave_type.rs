//! Leave types and application statuses shared by the leave and advance flows.

use crate::errors::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of leave an employee can apply for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    /// The monthly day off; one staff member per branch per month
    Monthly,
    Annual,
    Sick,
    Maternity,
    Paternity,
    Compassionate,
    Study,
    Unpaid,
}

impl LeaveType {
    /// Every leave type, in the order the portal offers them.
    pub const ALL: [Self; 8] = [
        Self::Monthly,
        Self::Annual,
        Self::Sick,
        Self::Maternity,
        Self::Paternity,
        Self::Compassionate,
        Self::Study,
        Self::Unpaid,
    ];

    /// Name stored in the `leave_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
            Self::Sick => "sick",
            Self::Maternity => "maternity",
            Self::Paternity => "paternity",
            Self::Compassionate => "compassionate",
            Self::Study => "study",
            Self::Unpaid => "unpaid",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| Error::Validation {
                field: "leave_type".to_string(),
                message: format!("unknown leave type '{s}'"),
            })
    }
}

/// Lifecycle of a leave or salary-advance application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    /// Salary advances only: money has been disbursed
    Paid,
    Cancelled,
}

impl ApplicationStatus {
    const ALL: [Self; 5] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Paid,
        Self::Cancelled,
    ];

    /// Name stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses that still count against the monthly allowance.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Whether an administrator may move an application from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Rejected | Self::Cancelled)
                | (Self::Approved, Self::Paid | Self::Rejected)
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| Error::Validation {
                field: "status".to_string(),
                message: format!("unknown status '{s}'"),
            })
    }
}
