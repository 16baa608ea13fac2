//! Core business logic - framework-agnostic leave and salary-advance rules.

/// Salary advance eligibility, submission and administration
pub mod advance;
/// Pure monthly eligibility rules and form validation
pub mod eligibility;
/// Employee lookups
pub mod employee;
/// Leave application eligibility, submission and status changes
pub mod leave;
/// Leave types and application statuses
pub mod leave_type;
/// Calendar-month eligibility window
pub mod window;

pub use eligibility::{BlockReason, Eligibility, EligibilityState, EligibilityTracker};
pub use leave_type::{ApplicationStatus, LeaveType};
pub use window::EligibilityWindow;
