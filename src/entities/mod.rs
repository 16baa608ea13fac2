//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod employee;
pub mod leave_application;
pub mod salary_advance;
pub mod system_state;

// Re-export specific types to avoid conflicts
pub use employee::{Column as EmployeeColumn, Entity as Employee, Model as EmployeeModel};
pub use leave_application::{
    Column as LeaveApplicationColumn, Entity as LeaveApplication, Model as LeaveApplicationModel,
};
pub use salary_advance::{
    Column as SalaryAdvanceColumn, Entity as SalaryAdvance, Model as SalaryAdvanceModel,
};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
