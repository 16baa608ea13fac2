#![allow(clippy::result_large_err)]

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use staff_portal::{
    config::{self, Settings, database},
    core::{
        ApplicationStatus, EligibilityWindow, LeaveType, advance,
        eligibility::{AdvanceRequest, Eligibility, LeaveRequest, parse_amount},
        employee, leave,
    },
    errors::{Error, Result},
    storage::LocalStorage,
    upload::{
        self, PendingFile, UploadBatch, document::file_extension, format_upload_summary,
    },
};
use std::{env, path::PathBuf, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "staff-portal", about = "Staff portal administration and self-service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an employee
    AddEmployee {
        employee_number: String,
        first_name: String,
        last_name: String,
        branch: String,
        /// Monthly basic salary
        basic_salary: f64,
    },
    /// Check leave eligibility for this month, optionally submitting the application
    CheckLeave {
        employee_number: String,
        /// monthly, annual, sick, maternity, paternity, compassionate, study or unpaid
        leave_type: LeaveType,
        /// First day of leave (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day of leave (YYYY-MM-DD), defaults to the start date
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        reason: String,
        /// Submit the application when eligible
        #[arg(long)]
        submit: bool,
    },
    /// Check salary advance eligibility for this month, optionally submitting
    CheckAdvance {
        employee_number: String,
        /// Requested amount, digits and an optional decimal point
        amount: String,
        #[arg(long, default_value = "")]
        reason: String,
        #[arg(long)]
        submit: bool,
    },
    /// Open or close the salary advance application period
    SetAdvancePeriod {
        #[arg(value_parser = ["open", "closed"])]
        state: String,
    },
    /// Move a leave application to a new status
    ReviewLeave { id: i64, status: ApplicationStatus },
    /// Move a salary advance to a new status
    ReviewAdvance { id: i64, status: ApplicationStatus },
    /// Show an employee's applications
    History { employee_number: String },
    /// Upload documents as TYPE=PATH pairs, e.g. `cv=./cv.pdf`
    Upload {
        employee_number: String,
        #[arg(required = true, value_parser = parse_document_arg)]
        files: Vec<(String, PathBuf)>,
    },
    /// List an employee's stored documents
    Documents { employee_number: String },
    /// Delete one stored document
    DeleteDocument { employee_number: String, path: String },
}

fn parse_document_arg(raw: &str) -> std::result::Result<(String, PathBuf), String> {
    raw.split_once('=')
        .filter(|(t, p)| !t.is_empty() && !p.is_empty())
        .map(|(t, p)| (t.to_string(), PathBuf::from(p)))
        .ok_or_else(|| format!("expected TYPE=PATH, got `{raw}`"))
}

fn guess_content_type(file_name: &str) -> &'static str {
    match file_extension(file_name).map(str::to_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

fn print_eligibility(eligibility: &Eligibility, window: EligibilityWindow) {
    match eligibility.reason() {
        None => println!("Eligible for {}", window.label()),
        Some(reason) => println!("Not eligible: {reason}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Portal settings
    let settings_path = env::var("PORTAL_CONFIG").unwrap_or_else(|_| "portal.toml".to_string());
    let settings = config::load_settings_or_default(&settings_path)?;

    // 4. Database
    let db = database::create_connection().await?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    run(cli.command, &db, &settings).await
}

#[allow(clippy::too_many_lines)]
async fn run(command: Commands, db: &sea_orm::DatabaseConnection, settings: &Settings) -> Result<()> {
    match command {
        Commands::AddEmployee {
            employee_number,
            first_name,
            last_name,
            branch,
            basic_salary,
        } => {
            let created = employee::create_employee(
                db,
                &employee_number,
                &first_name,
                &last_name,
                &branch,
                basic_salary,
            )
            .await?;
            println!("Registered {} ({})", created.full_name(), created.employee_number);
        }
        Commands::CheckLeave {
            employee_number,
            leave_type,
            start,
            end,
            reason,
            submit,
        } => {
            let staff = employee::require_employee(db, &employee_number).await?;
            let start_date = start.unwrap_or_else(|| Utc::now().date_naive());
            let request = LeaveRequest {
                employee_name: staff.full_name(),
                employee_number: staff.employee_number,
                branch: staff.branch,
                leave_type,
                start_date,
                end_date: end.unwrap_or(start_date),
                reason,
            };

            if submit {
                let saved = leave::submit_leave_application(db, &request, &settings.leave).await?;
                println!("Leave application #{} submitted", saved.id);
            } else {
                let window = EligibilityWindow::current();
                let eligibility =
                    leave::check_leave_eligibility(db, &request, &settings.leave, window).await?;
                print_eligibility(&eligibility, window);
            }
        }
        Commands::CheckAdvance {
            employee_number,
            amount,
            reason,
            submit,
        } => {
            if submit {
                let saved = advance::submit_advance_application(
                    db,
                    &employee_number,
                    &amount,
                    &reason,
                    &settings.advance,
                )
                .await?;
                println!("Salary advance #{} submitted for {:.2}", saved.id, saved.amount_requested);
            } else {
                let cap = advance::get_advance_cap(db, &employee_number, &settings.advance).await?;
                println!("Maximum advance: {cap:.2}");
                let request = AdvanceRequest {
                    employee_number,
                    amount: parse_amount(&amount)?,
                    reason,
                };
                let window = EligibilityWindow::current();
                let eligibility =
                    advance::check_advance_eligibility(db, &request, &settings.advance, window)
                        .await?;
                print_eligibility(&eligibility, window);
            }
        }
        Commands::SetAdvancePeriod { state } => {
            let open = state == "open";
            advance::set_advance_period_open(db, open).await?;
            println!("Salary advance period is now {state}");
        }
        Commands::ReviewLeave { id, status } => {
            let updated = leave::update_leave_status(db, id, status).await?;
            println!("Leave application #{} is now {}", updated.id, updated.status);
        }
        Commands::ReviewAdvance { id, status } => {
            let updated = advance::update_advance_status(db, id, status).await?;
            println!("Salary advance #{} is now {}", updated.id, updated.status);
        }
        Commands::History { employee_number } => {
            for app in leave::get_leave_applications_for_employee(db, &employee_number).await? {
                println!(
                    "leave   #{:<4} {:<13} {} to {}  {:<9} {}",
                    app.id,
                    app.leave_type,
                    app.start_date,
                    app.end_date,
                    app.status,
                    app.submitted_at.format("%Y-%m-%d")
                );
            }
            for adv in advance::get_advances_for_employee(db, &employee_number).await? {
                println!(
                    "advance #{:<4} {:>12.2}  {:<9} {}",
                    adv.id,
                    adv.amount_requested,
                    adv.status,
                    adv.submitted_at.format("%Y-%m-%d")
                );
            }
        }
        Commands::Upload {
            employee_number,
            files,
        } => upload_documents(&employee_number, files, settings).await?,
        Commands::Documents { employee_number } => {
            let storage = open_storage(settings).await?;
            let docs = upload::list_documents(
                storage.as_ref(),
                &employee_number,
                &settings.uploads.document_types,
            )
            .await?;
            if docs.is_empty() {
                println!("No documents uploaded yet");
            }
            for doc in docs {
                println!(
                    "{:<22} {:>8}  {}  {}",
                    doc.label,
                    doc.formatted_size,
                    doc.created_at.format("%Y-%m-%d %H:%M"),
                    doc.public_url
                );
            }
        }
        Commands::DeleteDocument {
            employee_number,
            path,
        } => {
            let storage = open_storage(settings).await?;
            upload::delete_document(storage.as_ref(), &employee_number, &path).await?;
            println!("Deleted {path}");
        }
    }
    Ok(())
}

async fn open_storage(settings: &Settings) -> Result<Arc<LocalStorage>> {
    let storage = LocalStorage::new(
        &settings.uploads.storage_root,
        settings.uploads.public_base_url.clone(),
    )
    .await?;
    Ok(Arc::new(storage))
}

async fn upload_documents(
    employee_number: &str,
    files: Vec<(String, PathBuf)>,
    settings: &Settings,
) -> Result<()> {
    let storage = open_storage(settings).await?;
    let committed = upload::committed_types(
        storage.as_ref(),
        employee_number,
        &settings.uploads.document_types,
    )
    .await?;
    let mut batch =
        UploadBatch::new(storage, employee_number, &settings.uploads)?.with_committed(committed);

    for (document_type, path) in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Validation {
                field: document_type.clone(),
                message: format!("{} is not a file", path.display()),
            })?;
        let data = tokio::fs::read(&path).await?;
        let file = PendingFile::new(name.as_str(), guess_content_type(&name), data);
        if let Err(e) = batch.select_file(&document_type, file) {
            warn!(document_type, error = %e, "File not accepted");
            println!("{document_type}: {e}");
        }
    }

    let handle = batch.handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let cancelled = handle.cancel_all();
            warn!(cancelled, "Interrupted, cancelling uploads");
        }
    });

    let summary = batch.upload().await;
    interrupt.abort();

    for report in &summary.reports {
        let message = report.status.message().unwrap_or_default();
        println!("{:<14} {message}", report.document_type);
    }
    println!("{}", format_upload_summary(&summary));
    Ok(())
}
