//! Employee lookups used by the eligibility flows.

use crate::{
    entities::{Employee, employee},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Finds an employee by payroll number.
pub async fn get_employee_by_number(
    db: &DatabaseConnection,
    employee_number: &str,
) -> Result<Option<employee::Model>> {
    Employee::find()
        .filter(employee::Column::EmployeeNumber.eq(employee_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_employee_by_number`], but a missing employee is an error.
pub async fn require_employee(
    db: &DatabaseConnection,
    employee_number: &str,
) -> Result<employee::Model> {
    get_employee_by_number(db, employee_number)
        .await?
        .ok_or_else(|| Error::EmployeeNotFound {
            employee_number: employee_number.to_string(),
        })
}

/// Registers an employee. Names and branch are trimmed; the salary must be a
/// non-negative finite number.
pub async fn create_employee(
    db: &DatabaseConnection,
    employee_number: &str,
    first_name: &str,
    last_name: &str,
    branch: &str,
    basic_salary: f64,
) -> Result<employee::Model> {
    let employee_number = employee_number.trim();
    if employee_number.is_empty() {
        return Err(Error::Validation {
            field: "employee_number".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if !basic_salary.is_finite() || basic_salary < 0.0 {
        return Err(Error::InvalidAmount {
            input: basic_salary.to_string(),
        });
    }

    let model = employee::ActiveModel {
        employee_number: Set(employee_number.to_string()),
        first_name: Set(first_name.trim().to_string()),
        last_name: Set(last_name.trim().to_string()),
        branch: Set(branch.trim().to_string()),
        basic_salary: Set(basic_salary),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_create_and_find_employee() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_employee(&db, " EMP001 ", "Jane", "Doe", "Nairobi", 50_000.0).await?;
        assert_eq!(created.employee_number, "EMP001");
        assert_eq!(created.full_name(), "Jane Doe");

        let found = get_employee_by_number(&db, "EMP001").await?.unwrap();
        assert_eq!(found.basic_salary, 50_000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_require_missing_employee() -> Result<()> {
        let db = setup_test_db().await?;
        let result = require_employee(&db, "NOPE").await;
        assert!(matches!(result, Err(Error::EmployeeNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_employee_validation() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            create_employee(&db, "  ", "A", "B", "C", 1.0).await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            create_employee(&db, "E1", "A", "B", "C", -1.0).await,
            Err(Error::InvalidAmount { .. })
        ));
        Ok(())
    }
}
