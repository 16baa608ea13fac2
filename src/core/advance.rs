//! Salary advance business logic
//!
//! Handles eligibility checks, submission and administrative status changes for
//! salary advances. Whether applications are accepted at all is controlled by a
//! flag in the `system_state` table so administrators can open and close the
//! application period without a deploy.

use crate::{
    config::AdvanceSettings,
    core::{
        ApplicationStatus, EligibilityWindow,
        eligibility::{
            AdvanceContext, AdvanceRequest, Eligibility, advance_cap, clamp_advance_amount,
            evaluate_advance, parse_amount, validate_reason,
        },
        employee::require_employee,
    },
    entities::{SalaryAdvance, SystemState, employee, salary_advance, system_state},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument, warn};

const ADVANCE_PERIOD_KEY: &str = "advance_period_open";

/// Reads the application-period flag. An unset flag counts as open.
pub async fn is_advance_period_open<C>(db: &C) -> Result<bool>
where
    C: ConnectionTrait,
{
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(ADVANCE_PERIOD_KEY))
        .one(db)
        .await?;

    match state {
        Some(s) => s.value.parse::<bool>().map_err(|e| Error::Config {
            message: format!("Invalid value '{}' for {ADVANCE_PERIOD_KEY}: {e}", s.value),
        }),
        None => Ok(true),
    }
}

/// Opens or closes the salary-advance application period.
pub async fn set_advance_period_open<C>(db: &C, open: bool) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(ADVANCE_PERIOD_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(open.to_string());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(ADVANCE_PERIOD_KEY.to_string()),
            value: Set(open.to_string()),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    info!(open, "Salary advance application period updated");
    Ok(())
}

/// The employee's advance records submitted inside `window`.
pub async fn get_window_advance_records(
    db: &DatabaseConnection,
    employee_number: &str,
    window: EligibilityWindow,
) -> Result<Vec<salary_advance::Model>> {
    let (start, end) = window.bounds();
    SalaryAdvance::find()
        .filter(salary_advance::Column::EmployeeNumber.eq(employee_number))
        .filter(salary_advance::Column::SubmittedAt.gte(start))
        .filter(salary_advance::Column::SubmittedAt.lt(end))
        .order_by_desc(salary_advance::Column::SubmittedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Largest advance the employee may request.
pub async fn get_advance_cap(
    db: &DatabaseConnection,
    employee_number: &str,
    settings: &AdvanceSettings,
) -> Result<f64> {
    let employee = require_employee(db, employee_number).await?;
    Ok(advance_cap(employee.basic_salary, settings.cap_percent))
}

/// Runs the salary-advance rules for `request` in `window`.
pub async fn check_advance_eligibility(
    db: &DatabaseConnection,
    request: &AdvanceRequest,
    settings: &AdvanceSettings,
    window: EligibilityWindow,
) -> Result<Eligibility> {
    let employee = require_employee(db, &request.employee_number).await?;
    check_advance_eligibility_for(db, &employee, request, settings, window).await
}

/// Like [`check_advance_eligibility`] for an employee that is already loaded.
pub async fn check_advance_eligibility_for(
    db: &DatabaseConnection,
    employee: &employee::Model,
    request: &AdvanceRequest,
    settings: &AdvanceSettings,
    window: EligibilityWindow,
) -> Result<Eligibility> {
    let period_open = is_advance_period_open(db).await?;
    let records = get_window_advance_records(db, &request.employee_number, window).await?;

    Ok(evaluate_advance(
        request,
        &AdvanceContext {
            basic_salary: employee.basic_salary,
            cap_percent: settings.cap_percent,
            period_open,
            window,
            records: &records,
        },
    ))
}

/// Validates the typed form, checks this month's eligibility and stores a pending
/// advance.
///
/// # Errors
/// * `Error::InvalidAmount` if `raw_amount` is not a positive plain number
/// * `Error::Validation` if the reason is too short or the amount is above the cap
///   (the message carries the clamped maximum)
/// * `Error::NotEligible` if the period is closed or the employee already applied
#[instrument(skip(db, reason, settings))]
pub async fn submit_advance_application(
    db: &DatabaseConnection,
    employee_number: &str,
    raw_amount: &str,
    reason: &str,
    settings: &AdvanceSettings,
) -> Result<salary_advance::Model> {
    let amount = parse_amount(raw_amount)?;
    validate_reason("reason", reason, settings.min_reason_chars)?;

    let employee = require_employee(db, employee_number).await?;
    let cap = advance_cap(employee.basic_salary, settings.cap_percent);
    if let Some(message) = clamp_advance_amount(amount, cap).message {
        warn!(amount, cap, "Advance amount above cap");
        return Err(Error::Validation {
            field: "amount".to_string(),
            message,
        });
    }

    let now = Utc::now();
    let request = AdvanceRequest {
        employee_number: employee.employee_number.clone(),
        amount,
        reason: reason.trim().to_string(),
    };
    check_advance_eligibility_for(
        db,
        &employee,
        &request,
        settings,
        EligibilityWindow::for_instant(now),
    )
    .await?
    .into_result()?;

    let advance = salary_advance::ActiveModel {
        employee_number: Set(request.employee_number),
        employee_name: Set(employee.full_name()),
        branch: Set(employee.branch),
        amount_requested: Set(amount),
        reason: Set(request.reason),
        status: Set(ApplicationStatus::Pending.as_str().to_string()),
        submitted_at: Set(now),
        last_updated: Set(now),
        ..Default::default()
    };
    let saved = advance.insert(db).await?;
    info!(id = saved.id, amount, "Salary advance submitted");
    Ok(saved)
}

/// Moves an advance to `status`, stamping the matching decision time.
///
/// Allowed: `pending -> approved | rejected | cancelled`, `approved -> paid | rejected`.
pub async fn update_advance_status(
    db: &DatabaseConnection,
    advance_id: i64,
    status: ApplicationStatus,
) -> Result<salary_advance::Model> {
    let advance = SalaryAdvance::find_by_id(advance_id)
        .one(db)
        .await?
        .ok_or(Error::ApplicationNotFound { id: advance_id })?;

    let current: ApplicationStatus = advance.status.parse()?;
    if !current.can_transition_to(status) {
        return Err(Error::InvalidStatusTransition {
            from: current.to_string(),
            to: status.to_string(),
        });
    }

    let now = Utc::now();
    let mut active_model: salary_advance::ActiveModel = advance.into();
    active_model.status = Set(status.as_str().to_string());
    active_model.last_updated = Set(now);
    match status {
        ApplicationStatus::Approved => active_model.approved_at = Set(Some(now)),
        ApplicationStatus::Rejected => active_model.rejected_at = Set(Some(now)),
        ApplicationStatus::Paid => active_model.paid_at = Set(Some(now)),
        ApplicationStatus::Pending | ApplicationStatus::Cancelled => {}
    }

    let updated = active_model.update(db).await?;
    info!(id = advance_id, %status, "Salary advance status updated");
    Ok(updated)
}

/// All advances of one employee, newest first.
pub async fn get_advances_for_employee(
    db: &DatabaseConnection,
    employee_number: &str,
) -> Result<Vec<salary_advance::Model>> {
    SalaryAdvance::find()
        .filter(salary_advance::Column::EmployeeNumber.eq(employee_number))
        .order_by_desc(salary_advance::Column::SubmittedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
