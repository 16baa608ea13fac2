//! Employee entity - The staff record eligibility checks are resolved against.
//!
//! Only the columns the portal core reads are modelled: identity, branch and the
//! basic salary the salary-advance cap is computed from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Payroll employee number (e.g. "EMP001"), unique per employee
    #[sea_orm(unique)]
    pub employee_number: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Branch the employee works from
    pub branch: String,
    /// Monthly basic salary in whole currency units
    pub basic_salary: f64,
}

impl Model {
    /// "First Last", as shown in blocking reasons and reports.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// `Employee` has no modelled relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
