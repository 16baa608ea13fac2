//! Monthly eligibility rules for leave and salary-advance applications.
//!
//! Everything here is pure: callers fetch the records for the current
//! [`EligibilityWindow`] and hand them in, so the rules can be exercised without a
//! database. [`crate::core::leave`] and [`crate::core::advance`] do the fetching.
//!
//! Leave rules, checked in order:
//! 1. A type disabled in the portal (annual leave by default) is always blocked.
//! 2. Monthly leave is branch-exclusive: if a colleague in the same branch holds an
//!    active monthly leave this month, the request is blocked naming them.
//! 3. Each leave type can be used once per month by the same employee.
//!
//! Salary-advance rules, checked in order: the application period must be open, the
//! employee must not have applied this month, and the amount must not exceed the cap
//! (a percentage of basic salary, inclusive).

use crate::{
    config::LeaveSettings,
    core::{ApplicationStatus, EligibilityWindow, LeaveType},
    entities::{leave_application, salary_advance},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use std::fmt;

/// A leave application as typed into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    /// Requester's employee number
    pub employee_number: String,
    /// Requester's display name
    pub employee_name: String,
    /// Branch the leave is taken from
    pub branch: String,
    /// Requested leave type
    pub leave_type: LeaveType,
    /// First day of leave
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive)
    pub end_date: NaiveDate,
    /// Free-text reason
    pub reason: String,
}

/// A salary-advance application as typed into the form.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceRequest {
    /// Requester's employee number
    pub employee_number: String,
    /// Requested amount, already parsed with [`parse_amount`]
    pub amount: f64,
    /// Free-text reason
    pub reason: String,
}

/// Everything besides the request that the advance rules look at.
#[derive(Debug, Clone, Copy)]
pub struct AdvanceContext<'a> {
    /// Requester's monthly basic salary
    pub basic_salary: f64,
    /// Cap as a percentage of basic salary
    pub cap_percent: u32,
    /// Whether the application period is currently open
    pub period_open: bool,
    /// Month the rules apply to
    pub window: EligibilityWindow,
    /// The requester's own advance records
    pub records: &'a [salary_advance::Model],
}

/// Why a submission is not allowed.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockReason {
    /// The leave type cannot be applied for from the portal
    LeaveTypeDisabled {
        /// Disabled type
        leave_type: LeaveType,
    },
    /// Another employee already holds this month's monthly leave for the branch
    BranchTaken {
        /// Name of the colleague holding the leave
        colleague: String,
        /// Branch in question
        branch: String,
    },
    /// The requester already used this leave type this month
    LeaveTypeUsed {
        /// Type already used
        leave_type: LeaveType,
    },
    /// Salary-advance applications are closed
    PeriodClosed,
    /// The requester already applied for an advance this month
    AdvanceAlreadyApplied {
        /// Status of the existing application
        status: ApplicationStatus,
    },
    /// The requested advance exceeds the cap
    AmountAboveCap {
        /// Amount requested
        requested: f64,
        /// Largest allowed amount
        cap: f64,
    },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeaveTypeDisabled { leave_type } => {
                write!(f, "{leave_type} leave cannot be applied for from the portal")
            }
            Self::BranchTaken { colleague, branch } => write!(
                f,
                "{colleague} from {branch} has already taken monthly leave this month. \
                 Only one staff member per branch can take monthly leave each month."
            ),
            Self::LeaveTypeUsed { leave_type } => {
                write!(f, "You have already used your {leave_type} leave this month")
            }
            Self::PeriodClosed => f.write_str("Salary advance applications are currently closed"),
            Self::AdvanceAlreadyApplied { status } => write!(
                f,
                "You have already applied for a salary advance this month (status: {status})"
            ),
            Self::AmountAboveCap { requested, cap } => write!(
                f,
                "Requested amount {requested:.2} exceeds the maximum of {cap:.2}"
            ),
        }
    }
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility {
    Eligible,
    Blocked(BlockReason),
}

impl Eligibility {
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    /// The blocking reason, if any.
    #[must_use]
    pub const fn reason(&self) -> Option<&BlockReason> {
        match self {
            Self::Eligible => None,
            Self::Blocked(reason) => Some(reason),
        }
    }

    /// Turns a blocked outcome into [`Error::NotEligible`].
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Eligible => Ok(()),
            Self::Blocked(reason) => Err(Error::NotEligible {
                reason: reason.to_string(),
            }),
        }
    }
}

/// Per-form check state: `Unchecked -> Checking -> {Eligible, Blocked}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EligibilityState {
    #[default]
    Unchecked,
    Checking,
    Eligible,
    Blocked(BlockReason),
}

/// Tracks [`EligibilityState`] for one form instance.
///
/// Every input change (branch, leave type, amount) starts a new check and returns a
/// ticket; results carrying an older ticket are dropped so a slow query can never
/// overwrite the answer for newer input.
#[derive(Debug, Clone, Default)]
pub struct EligibilityTracker {
    state: EligibilityState,
    generation: u64,
}

impl EligibilityTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &EligibilityState {
        &self.state
    }

    /// A dependency changed; re-enter `Checking` and return the ticket for the new check.
    pub fn inputs_changed(&mut self) -> u64 {
        self.generation += 1;
        self.state = EligibilityState::Checking;
        self.generation
    }

    /// Records the result of the check started with `ticket`. Returns `false` if the
    /// result was stale and ignored.
    pub fn resolve(&mut self, ticket: u64, eligibility: Eligibility) -> bool {
        if ticket != self.generation || self.state != EligibilityState::Checking {
            return false;
        }
        self.state = match eligibility {
            Eligibility::Eligible => EligibilityState::Eligible,
            Eligibility::Blocked(reason) => EligibilityState::Blocked(reason),
        };
        true
    }

    /// Only a completed, eligible check allows submission.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.state == EligibilityState::Eligible
    }
}

fn is_active(status: &str) -> bool {
    status
        .parse::<ApplicationStatus>()
        .is_ok_and(ApplicationStatus::is_active)
}

/// Evaluates a leave request against the records of `window`.
///
/// `records` may contain any leave applications; only those submitted inside the
/// window with an active status are considered. Records from the requester's branch
/// drive the branch-exclusivity rule, the requester's own records drive the
/// once-per-month rule.
#[must_use]
pub fn evaluate_leave(
    request: &LeaveRequest,
    records: &[leave_application::Model],
    window: EligibilityWindow,
    settings: &LeaveSettings,
) -> Eligibility {
    if settings.disabled_types.contains(&request.leave_type) {
        return Eligibility::Blocked(BlockReason::LeaveTypeDisabled {
            leave_type: request.leave_type,
        });
    }

    let active_this_month = || {
        records
            .iter()
            .filter(|r| window.contains(r.submitted_at) && is_active(&r.status))
    };

    if request.leave_type == LeaveType::Monthly {
        let holder = active_this_month().find(|r| {
            r.branch == request.branch
                && r.leave_type == LeaveType::Monthly.as_str()
                && r.employee_number != request.employee_number
        });
        if let Some(holder) = holder {
            return Eligibility::Blocked(BlockReason::BranchTaken {
                colleague: holder.employee_name.clone(),
                branch: holder.branch.clone(),
            });
        }
    }

    let already_used = active_this_month().any(|r| {
        r.employee_number == request.employee_number
            && r.leave_type == request.leave_type.as_str()
    });
    if already_used {
        return Eligibility::Blocked(BlockReason::LeaveTypeUsed {
            leave_type: request.leave_type,
        });
    }

    Eligibility::Eligible
}

/// Largest advance allowed for `basic_salary`, truncated to whole cents.
#[must_use]
pub fn advance_cap(basic_salary: f64, cap_percent: u32) -> f64 {
    (basic_salary * f64::from(cap_percent)).floor().max(0.0) / 100.0
}

#[allow(clippy::cast_possible_truncation)]
fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Whether `requested` is above `cap`, compared in whole cents so that a request of
/// exactly the cap is never rejected by float rounding.
#[must_use]
pub fn exceeds_cap(requested: f64, cap: f64) -> bool {
    to_cents(requested) > to_cents(cap)
}

/// Result of clamping a typed amount to the advance cap.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountCheck {
    /// Amount to show in the form after clamping
    pub amount: f64,
    /// Validation message when the amount had to be clamped
    pub message: Option<String>,
}

/// Clamps `requested` to `cap`, producing the message the form shows when it does.
#[must_use]
pub fn clamp_advance_amount(requested: f64, cap: f64) -> AmountCheck {
    if exceeds_cap(requested, cap) {
        AmountCheck {
            amount: cap,
            message: Some(format!("Amount cannot exceed {cap:.2} (maximum advance)")),
        }
    } else {
        AmountCheck {
            amount: requested,
            message: None,
        }
    }
}

/// Evaluates a salary-advance request.
#[must_use]
pub fn evaluate_advance(request: &AdvanceRequest, context: &AdvanceContext<'_>) -> Eligibility {
    if !context.period_open {
        return Eligibility::Blocked(BlockReason::PeriodClosed);
    }

    let existing = context.records.iter().find(|r| {
        r.employee_number == request.employee_number
            && context.window.contains(r.submitted_at)
            && r.status != ApplicationStatus::Cancelled.as_str()
    });
    if let Some(existing) = existing {
        let status = existing
            .status
            .parse()
            .unwrap_or(ApplicationStatus::Pending);
        return Eligibility::Blocked(BlockReason::AdvanceAlreadyApplied { status });
    }

    let cap = advance_cap(context.basic_salary, context.cap_percent);
    if exceeds_cap(request.amount, cap) {
        return Eligibility::Blocked(BlockReason::AmountAboveCap {
            requested: request.amount,
            cap,
        });
    }

    Eligibility::Eligible
}

/// Parses an amount field. Only plain decimal numbers are accepted: no sign, no
/// exponent, no separators, and the value must be greater than zero.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let invalid = || Error::InvalidAmount {
        input: raw.to_string(),
    };

    let dots = trimmed.chars().filter(|c| *c == '.').count();
    let well_formed = !trimmed.is_empty()
        && dots <= 1
        && trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.');
    if !well_formed {
        return Err(invalid());
    }

    let amount: f64 = trimmed.parse().map_err(|_| invalid())?;
    if amount > 0.0 && amount.is_finite() {
        Ok(amount)
    } else {
        Err(invalid())
    }
}

/// Checks that a free-text field has at least `min_chars` characters once trimmed.
pub fn validate_reason(field: &str, text: &str, min_chars: usize) -> Result<()> {
    if text.trim().chars().count() < min_chars {
        return Err(Error::Validation {
            field: field.to_string(),
            message: format!("must be at least {min_chars} characters"),
        });
    }
    Ok(())
}

/// Checks that a leave period does not end before it starts.
pub fn validate_leave_dates(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(Error::Validation {
            field: "end_date".to_string(),
            message: "must not be before the start date".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn window() -> EligibilityWindow {
        EligibilityWindow::containing(NaiveDate::from_ymd_opt(2024, 5, 14).unwrap())
    }

    fn in_window() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 3, 9, 30, 0).unwrap()
    }

    fn leave_record(
        employee: &str,
        name: &str,
        branch: &str,
        leave_type: LeaveType,
        status: &str,
        submitted_at: DateTime<Utc>,
    ) -> leave_application::Model {
        leave_application::Model {
            id: 1,
            employee_number: employee.to_string(),
            employee_name: name.to_string(),
            branch: branch.to_string(),
            leave_type: leave_type.as_str().to_string(),
            start_date: submitted_at.date_naive(),
            end_date: submitted_at.date_naive(),
            reason: "Family commitments".to_string(),
            status: status.to_string(),
            submitted_at,
        }
    }

    fn leave_request(employee: &str, branch: &str, leave_type: LeaveType) -> LeaveRequest {
        LeaveRequest {
            employee_number: employee.to_string(),
            employee_name: format!("Name of {employee}"),
            branch: branch.to_string(),
            leave_type,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            reason: "Personal errands to run".to_string(),
        }
    }

    fn advance_record(employee: &str, status: &str) -> salary_advance::Model {
        salary_advance::Model {
            id: 7,
            employee_number: employee.to_string(),
            employee_name: "Jane Doe".to_string(),
            branch: "B".to_string(),
            amount_requested: 1000.0,
            reason: "School fees balance".to_string(),
            status: status.to_string(),
            submitted_at: in_window(),
            last_updated: in_window(),
            approved_at: None,
            rejected_at: None,
            paid_at: None,
        }
    }

    #[test]
    fn test_branch_taken_blocks_colleague_and_names_holder() {
        let records = vec![leave_record(
            "X",
            "Xavier Otieno",
            "B",
            LeaveType::Monthly,
            "approved",
            in_window(),
        )];
        let result = evaluate_leave(
            &leave_request("Y", "B", LeaveType::Monthly),
            &records,
            window(),
            &LeaveSettings::default(),
        );

        let Eligibility::Blocked(reason) = result else {
            panic!("expected blocked, got {result:?}");
        };
        assert_eq!(
            reason,
            BlockReason::BranchTaken {
                colleague: "Xavier Otieno".to_string(),
                branch: "B".to_string()
            }
        );
        let message = reason.to_string();
        assert!(message.contains("Xavier Otieno"));
        assert!(message.contains('B'));
    }

    #[test]
    fn test_holder_can_take_different_type_same_month() {
        let records = vec![leave_record(
            "X",
            "Xavier Otieno",
            "B",
            LeaveType::Monthly,
            "pending",
            in_window(),
        )];
        let result = evaluate_leave(
            &leave_request("X", "B", LeaveType::Sick),
            &records,
            window(),
            &LeaveSettings::default(),
        );
        assert_eq!(result, Eligibility::Eligible);
    }

    #[test]
    fn test_same_type_twice_is_blocked_for_holder() {
        let records = vec![leave_record(
            "X",
            "Xavier Otieno",
            "B",
            LeaveType::Monthly,
            "pending",
            in_window(),
        )];
        let result = evaluate_leave(
            &leave_request("X", "B", LeaveType::Monthly),
            &records,
            window(),
            &LeaveSettings::default(),
        );
        assert_eq!(
            result,
            Eligibility::Blocked(BlockReason::LeaveTypeUsed {
                leave_type: LeaveType::Monthly
            })
        );
    }

    #[test]
    fn test_other_branch_and_inactive_records_do_not_block() {
        let records = vec![
            leave_record("X", "Xavier", "A", LeaveType::Monthly, "approved", in_window()),
            leave_record("Z", "Zawadi", "B", LeaveType::Monthly, "rejected", in_window()),
            leave_record("W", "Wanjiru", "B", LeaveType::Monthly, "cancelled", in_window()),
        ];
        let result = evaluate_leave(
            &leave_request("Y", "B", LeaveType::Monthly),
            &records,
            window(),
            &LeaveSettings::default(),
        );
        assert_eq!(result, Eligibility::Eligible);
    }

    #[test]
    fn test_records_outside_window_do_not_block() {
        let last_month = Utc.with_ymd_and_hms(2024, 4, 30, 23, 0, 0).unwrap();
        let records = vec![leave_record(
            "X",
            "Xavier",
            "B",
            LeaveType::Monthly,
            "approved",
            last_month,
        )];
        let result = evaluate_leave(
            &leave_request("Y", "B", LeaveType::Monthly),
            &records,
            window(),
            &LeaveSettings::default(),
        );
        assert_eq!(result, Eligibility::Eligible);
    }

    #[test]
    fn test_branch_exclusivity_only_applies_to_monthly_leave() {
        let records = vec![leave_record(
            "X",
            "Xavier",
            "B",
            LeaveType::Sick,
            "approved",
            in_window(),
        )];
        let result = evaluate_leave(
            &leave_request("Y", "B", LeaveType::Sick),
            &records,
            window(),
            &LeaveSettings::default(),
        );
        assert_eq!(result, Eligibility::Eligible);
    }

    #[test]
    fn test_disabled_type_is_blocked_without_records() {
        let result = evaluate_leave(
            &leave_request("Y", "B", LeaveType::Annual),
            &[],
            window(),
            &LeaveSettings::default(),
        );
        assert_eq!(
            result,
            Eligibility::Blocked(BlockReason::LeaveTypeDisabled {
                leave_type: LeaveType::Annual
            })
        );
    }

    #[test]
    fn test_advance_cap_boundary_is_inclusive() {
        let records = [];
        let context = AdvanceContext {
            basic_salary: 50_000.0,
            cap_percent: 20,
            period_open: true,
            window: window(),
            records: &records,
        };
        let at_cap = AdvanceRequest {
            employee_number: "X".to_string(),
            amount: 10_000.0,
            reason: "Medical bills for family".to_string(),
        };
        assert_eq!(evaluate_advance(&at_cap, &context), Eligibility::Eligible);

        let above = AdvanceRequest {
            amount: 10_001.0,
            ..at_cap
        };
        assert_eq!(
            evaluate_advance(&above, &context),
            Eligibility::Blocked(BlockReason::AmountAboveCap {
                requested: 10_001.0,
                cap: 10_000.0
            })
        );
    }

    #[test]
    fn test_clamp_advance_amount() {
        let cap = advance_cap(50_000.0, 20);
        assert_eq!(cap, 10_000.0);

        let within = clamp_advance_amount(10_000.0, cap);
        assert_eq!(within.amount, 10_000.0);
        assert!(within.message.is_none());

        let above = clamp_advance_amount(10_001.0, cap);
        assert_eq!(above.amount, 10_000.0);
        assert!(above.message.unwrap().contains("10000.00"));
    }

    #[test]
    fn test_advance_cap_keeps_cents() {
        assert_eq!(advance_cap(33_333.0, 20), 6_666.6);
        assert_eq!(advance_cap(12_345.67, 20), 2_469.13);
        assert_eq!(advance_cap(0.0, 20), 0.0);
    }

    #[test]
    fn test_exactly_twenty_percent_of_odd_salary_is_eligible() {
        let records = [];
        let context = AdvanceContext {
            basic_salary: 33_333.0,
            cap_percent: 20,
            period_open: true,
            window: window(),
            records: &records,
        };
        let at_cap = AdvanceRequest {
            employee_number: "X".to_string(),
            amount: 6_666.6,
            reason: "Rent arrears this month".to_string(),
        };
        assert_eq!(evaluate_advance(&at_cap, &context), Eligibility::Eligible);
        assert!(clamp_advance_amount(6_666.6, advance_cap(33_333.0, 20)).message.is_none());

        let above = AdvanceRequest {
            amount: 6_666.61,
            ..at_cap
        };
        assert!(matches!(
            evaluate_advance(&above, &context),
            Eligibility::Blocked(BlockReason::AmountAboveCap { .. })
        ));
    }

    #[test]
    fn test_advance_blocked_when_period_closed() {
        let records = [];
        let context = AdvanceContext {
            basic_salary: 50_000.0,
            cap_percent: 20,
            period_open: false,
            window: window(),
            records: &records,
        };
        let request = AdvanceRequest {
            employee_number: "X".to_string(),
            amount: 100.0,
            reason: "Rent top up this month".to_string(),
        };
        assert_eq!(
            evaluate_advance(&request, &context),
            Eligibility::Blocked(BlockReason::PeriodClosed)
        );
    }

    #[test]
    fn test_advance_blocked_once_applied_and_reports_status() {
        let records = [advance_record("X", "approved")];
        let context = AdvanceContext {
            basic_salary: 50_000.0,
            cap_percent: 20,
            period_open: true,
            window: window(),
            records: &records,
        };
        let request = AdvanceRequest {
            employee_number: "X".to_string(),
            amount: 100.0,
            reason: "Rent top up this month".to_string(),
        };
        let result = evaluate_advance(&request, &context);
        assert_eq!(
            result,
            Eligibility::Blocked(BlockReason::AdvanceAlreadyApplied {
                status: ApplicationStatus::Approved
            })
        );
        assert!(result.reason().unwrap().to_string().contains("approved"));
    }

    #[test]
    fn test_cancelled_advance_does_not_count() {
        let records = [advance_record("X", "cancelled")];
        let context = AdvanceContext {
            basic_salary: 50_000.0,
            cap_percent: 20,
            period_open: true,
            window: window(),
            records: &records,
        };
        let request = AdvanceRequest {
            employee_number: "X".to_string(),
            amount: 100.0,
            reason: "Rent top up this month".to_string(),
        };
        assert!(evaluate_advance(&request, &context).is_eligible());
    }

    #[test]
    fn test_parse_amount_accepts_plain_numbers() {
        assert_eq!(parse_amount("1500").unwrap(), 1500.0);
        assert_eq!(parse_amount(" 1500.50 ").unwrap(), 1500.5);
        assert_eq!(parse_amount(".5").unwrap(), 0.5);
    }

    #[test]
    fn test_parse_amount_rejects_non_numeric() {
        for bad in ["", "abc", "12a", "-5", "+5", "1e3", "1,000", "1.2.3", ".", "0", "0.00"] {
            assert!(
                matches!(parse_amount(bad), Err(Error::InvalidAmount { .. })),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_reason_min_length() {
        assert!(validate_reason("reason", "too short", 10).is_err());
        assert!(validate_reason("reason", "   padded   ", 10).is_err());
        assert!(validate_reason("reason", "long enough", 10).is_ok());
    }

    #[test]
    fn test_validate_leave_dates() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        assert!(validate_leave_dates(d(2), d(1)).is_err());
        assert!(validate_leave_dates(d(1), d(1)).is_ok());
    }

    #[test]
    fn test_tracker_state_machine() {
        let mut tracker = EligibilityTracker::new();
        assert_eq!(tracker.state(), &EligibilityState::Unchecked);
        assert!(!tracker.can_submit());

        let ticket = tracker.inputs_changed();
        assert_eq!(tracker.state(), &EligibilityState::Checking);
        assert!(tracker.resolve(ticket, Eligibility::Eligible));
        assert!(tracker.can_submit());

        let ticket = tracker.inputs_changed();
        assert!(!tracker.can_submit());
        assert!(tracker.resolve(ticket, Eligibility::Blocked(BlockReason::PeriodClosed)));
        assert_eq!(
            tracker.state(),
            &EligibilityState::Blocked(BlockReason::PeriodClosed)
        );
    }

    #[test]
    fn test_tracker_drops_stale_results() {
        let mut tracker = EligibilityTracker::new();
        let stale = tracker.inputs_changed();
        let fresh = tracker.inputs_changed();

        assert!(!tracker.resolve(stale, Eligibility::Eligible));
        assert_eq!(tracker.state(), &EligibilityState::Checking);

        assert!(tracker.resolve(fresh, Eligibility::Blocked(BlockReason::PeriodClosed)));
        assert!(!tracker.can_submit());
    }

    #[test]
    fn test_into_result_maps_to_not_eligible() {
        let err = Eligibility::Blocked(BlockReason::PeriodClosed)
            .into_result()
            .unwrap_err();
        assert!(matches!(err, Error::NotEligible { .. }));
        assert!(Eligibility::Eligible.into_result().is_ok());
    }
}
