//! Leave application business logic.
//!
//! Fetches the month's leave records, runs them through
//! [`evaluate_leave`](crate::core::eligibility::evaluate_leave) and records new
//! applications once they pass. Local validation happens before any query is made.

use crate::{
    config::LeaveSettings,
    core::{
        ApplicationStatus, EligibilityWindow,
        eligibility::{Eligibility, LeaveRequest, evaluate_leave, validate_leave_dates, validate_reason},
    },
    entities::{LeaveApplication, leave_application},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Active leave records submitted inside `window` that belong either to `branch`
/// or to `employee_number`.
pub async fn get_window_leave_records(
    db: &DatabaseConnection,
    branch: &str,
    employee_number: &str,
    window: EligibilityWindow,
) -> Result<Vec<leave_application::Model>> {
    let (start, end) = window.bounds();
    LeaveApplication::find()
        .filter(leave_application::Column::SubmittedAt.gte(start))
        .filter(leave_application::Column::SubmittedAt.lt(end))
        .filter(leave_application::Column::Status.is_in([
            ApplicationStatus::Pending.as_str(),
            ApplicationStatus::Approved.as_str(),
        ]))
        .filter(
            Condition::any()
                .add(leave_application::Column::Branch.eq(branch))
                .add(leave_application::Column::EmployeeNumber.eq(employee_number)),
        )
        .order_by_asc(leave_application::Column::SubmittedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Runs the monthly leave rules for `request` against the records of `window`.
///
/// Disabled leave types are rejected without touching the database.
pub async fn check_leave_eligibility(
    db: &DatabaseConnection,
    request: &LeaveRequest,
    settings: &LeaveSettings,
    window: EligibilityWindow,
) -> Result<Eligibility> {
    if settings.disabled_types.contains(&request.leave_type) {
        return Ok(evaluate_leave(request, &[], window, settings));
    }

    let records =
        get_window_leave_records(db, &request.branch, &request.employee_number, window).await?;
    Ok(evaluate_leave(request, &records, window, settings))
}

/// Validates, checks eligibility for the current month and stores a pending leave
/// application.
///
/// # Errors
/// * `Error::Validation` if the reason is too short or the dates are reversed
/// * `Error::NotEligible` if the monthly rules block the request
#[instrument(skip(db, settings), fields(employee = %request.employee_number, leave_type = %request.leave_type))]
pub async fn submit_leave_application(
    db: &DatabaseConnection,
    request: &LeaveRequest,
    settings: &LeaveSettings,
) -> Result<leave_application::Model> {
    validate_reason("reason", &request.reason, settings.min_reason_chars)?;
    validate_leave_dates(request.start_date, request.end_date)?;

    let now = chrono::Utc::now();
    check_leave_eligibility(db, request, settings, EligibilityWindow::for_instant(now))
        .await?
        .into_result()?;

    let application = leave_application::ActiveModel {
        employee_number: Set(request.employee_number.clone()),
        employee_name: Set(request.employee_name.clone()),
        branch: Set(request.branch.clone()),
        leave_type: Set(request.leave_type.as_str().to_string()),
        start_date: Set(request.start_date),
        end_date: Set(request.end_date),
        reason: Set(request.reason.trim().to_string()),
        status: Set(ApplicationStatus::Pending.as_str().to_string()),
        submitted_at: Set(now),
        ..Default::default()
    };
    let saved = application.insert(db).await?;
    info!(id = saved.id, "Leave application submitted");
    Ok(saved)
}

/// All leave applications of one employee, newest first.
pub async fn get_leave_applications_for_employee(
    db: &DatabaseConnection,
    employee_number: &str,
) -> Result<Vec<leave_application::Model>> {
    LeaveApplication::find()
        .filter(leave_application::Column::EmployeeNumber.eq(employee_number))
        .order_by_desc(leave_application::Column::SubmittedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a leave application to `status`, enforcing the allowed transitions.
pub async fn update_leave_status(
    db: &DatabaseConnection,
    application_id: i64,
    status: ApplicationStatus,
) -> Result<leave_application::Model> {
    let application = LeaveApplication::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or(Error::ApplicationNotFound { id: application_id })?;

    let current: ApplicationStatus = application.status.parse()?;
    if status == ApplicationStatus::Paid || !current.can_transition_to(status) {
        return Err(Error::InvalidStatusTransition {
            from: current.to_string(),
            to: status.to_string(),
        });
    }

    let mut active_model: leave_application::ActiveModel = application.into();
    active_model.status = Set(status.as_str().to_string());
    let updated = active_model.update(db).await?;
    info!(id = application_id, %status, "Leave application status updated");
    Ok(updated)
}
