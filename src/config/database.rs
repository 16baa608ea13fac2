//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust models.

use crate::entities::{Employee, LeaveApplication, SalaryAdvance, SystemState};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/staff_portal.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(&get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates all tables from the entity definitions, skipping any that already exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut employee_table = schema.create_table_from_entity(Employee);
    let mut leave_table = schema.create_table_from_entity(LeaveApplication);
    let mut advance_table = schema.create_table_from_entity(SalaryAdvance);
    let mut system_state_table = schema.create_table_from_entity(SystemState);

    db.execute(builder.build(employee_table.if_not_exists()))
        .await?;
    db.execute(builder.build(leave_table.if_not_exists())).await?;
    db.execute(builder.build(advance_table.if_not_exists()))
        .await?;
    db.execute(builder.build(system_state_table.if_not_exists()))
        .await?;

    Ok(())
}
