//! Hostel records command-line tool.
//!
//! Each subcommand maps to one record operation. Reads print a relation,
//! writes print the resulting status message. The process exits with
//! status 1 whenever an operation reports failure.
//!
//! # Security Guarantees
//! - Database credentials are redacted before they are logged
//! - Login secrets are read without echo and zeroed after use
//! - The credentials table cannot be listed through `view-table`

mod output;

use clap::{Args, Parser, Subcommand};
use dormkeep_core::error::redact_database_url;
use dormkeep_core::logging::init_logging;
use dormkeep_core::validation::{parse_amount, parse_optional_id, parse_record_id};
use dormkeep_core::{Dormitory, Relation, Status, create_store};
use output::{OutputFormat, render_relation, render_status};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{debug, error, info};
use zeroize::Zeroizing;

const DEFAULT_DATABASE_URL: &str = "mysql://root@localhost/college_dorm";

#[derive(Parser)]
#[command(name = "dormkeep")]
#[command(about = "Hostel records over a drifting schema")]
#[command(version)]
#[command(long_about = "
Dormkeep - Hostel and dormitory records

Reads and writes students, rooms, fee payments and complaints. Column
names are discovered from the live database, so installations whose
tables drifted from the canonical layout keep working.

SUPPORTED DATABASES:
- MySQL (mysql://)
- SQLite (sqlite:// or .db/.sqlite files)

EXAMPLES:
  dormkeep students
  dormkeep complaints --student 101
  dormkeep pay 101 1500 UPI
  dormkeep --database-url sqlite://dorm.db details 101
")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = DEFAULT_DATABASE_URL,
        help = "Database connection string (credentials will be sanitized in logs)"
    )]
    database_url: String,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all log output except errors")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show every row of one table
    ViewTable {
        /// Table name (Staff, Room, Student, Fee_Payment or Complaint)
        table: String,
    },
    /// List students
    Students,
    /// Register a student
    AddStudent(AddStudentArgs),
    /// Change a student's department and fee status
    UpdateStudent {
        #[arg(value_parser = record_id)]
        student_id: i64,
        department: String,
        fee_status: String,
    },
    /// Remove a student
    DeleteStudent {
        #[arg(value_parser = record_id)]
        student_id: i64,
    },
    /// Record a fee payment and mark the student as paid
    Pay {
        #[arg(value_parser = record_id)]
        student_id: i64,
        #[arg(value_parser = amount)]
        amount: f64,
        payment_mode: String,
    },
    /// List complaints, newest first
    Complaints {
        /// Only show complaints raised by this student
        #[arg(long, value_parser = record_id)]
        student: Option<i64>,
    },
    /// Raise a complaint on behalf of a student
    RaiseComplaint {
        #[arg(value_parser = record_id)]
        student_id: i64,
        text: String,
    },
    /// Change the status of a complaint
    ComplaintStatus {
        #[arg(value_parser = record_id)]
        complaint_id: i64,
        status: String,
    },
    /// Per-student report with room and total fees paid
    Details {
        #[arg(value_parser = record_id)]
        student_id: i64,
    },
    /// Headline counters
    Dashboard,
    /// Summary row backed by the pending-fees routine
    Summary,
    /// Check a username and password
    Login {
        username: String,
    },
}

#[derive(Args)]
struct AddStudentArgs {
    #[arg(value_parser = record_id)]
    student_id: i64,
    name: String,
    gender: String,
    department: String,
    /// Room to allocate; omit or pass an empty value for none
    #[arg(long)]
    room: Option<String>,
}

fn record_id(raw: &str) -> Result<i64, String> {
    parse_record_id(raw).map_err(|e| e.to_string())
}

fn amount(raw: &str) -> Result<f64, String> {
    parse_amount(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected subcommand. `Ok(false)` means the operation reported
/// failure through its result.
async fn run(cli: &Cli) -> anyhow::Result<bool> {
    info!("Target: {}", redact_database_url(&cli.database_url));

    // reject a bad room id before connecting
    let room = match &cli.command {
        Command::AddStudent(args) => parse_optional_id(args.room.as_deref())?,
        _ => None,
    };

    let store = create_store(&cli.database_url).await.inspect_err(|e| {
        error!("Failed to open the record store: {}", e);
    })?;
    debug!("Connected to {} store", store.backend());
    let dorm = Dormitory::new(store);
    let format = cli.format;

    match &cli.command {
        Command::ViewTable { table } => print_relation(&dorm.view_table(table).await, format),
        Command::Students => print_relation(&dorm.list_students().await, format),
        Command::AddStudent(args) => {
            let status = dorm
                .add_student(
                    args.student_id,
                    &args.name,
                    &args.gender,
                    &args.department,
                    room,
                )
                .await;
            print_status(&status, format)
        }
        Command::UpdateStudent {
            student_id,
            department,
            fee_status,
        } => {
            let status = dorm
                .update_student(*student_id, department, fee_status)
                .await;
            print_status(&status, format)
        }
        Command::DeleteStudent { student_id } => {
            print_status(&dorm.delete_student(*student_id).await, format)
        }
        Command::Pay {
            student_id,
            amount,
            payment_mode,
        } => {
            let status = dorm.add_payment(*student_id, *amount, payment_mode).await;
            print_status(&status, format)
        }
        Command::Complaints { student } => {
            print_relation(&dorm.view_complaints(*student).await, format)
        }
        Command::RaiseComplaint { student_id, text } => {
            let (status, refreshed) = dorm.raise_complaint(*student_id, text).await;
            let written = print_status(&status, format)?;
            if written {
                print_relation(&refreshed, format)?;
            }
            Ok(written)
        }
        Command::ComplaintStatus {
            complaint_id,
            status,
        } => {
            let status = dorm.update_complaint_status(*complaint_id, status).await;
            print_status(&status, format)
        }
        Command::Details { student_id } => {
            print_relation(&dorm.student_details(*student_id).await, format)
        }
        Command::Dashboard => {
            let counts = dorm.dashboard_counts().await;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&counts)?),
                OutputFormat::Table => println!("{counts}"),
            }
            Ok(true)
        }
        Command::Summary => print_relation(&dorm.dashboard_summary().await, format),
        Command::Login { username } => {
            let secret = prompt_secret()?;
            let (status, credential) = dorm.login(username, &secret).await;
            if let Some(credential) = credential {
                debug!(
                    "Login for {} linked to {:?}",
                    credential.username, credential.linked_id
                );
            }
            print_status(&status, format)
        }
    }
}

/// Reads the login secret without echoing it.
fn prompt_secret() -> anyhow::Result<Zeroizing<String>> {
    print!("Password: ");
    io::stdout()
        .flush()
        .map_err(|e| anyhow::anyhow!("Failed to flush stdout before reading password: {e}"))?;
    let secret = rpassword::read_password()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {e}"))?;
    Ok(Zeroizing::new(secret))
}

fn print_relation(relation: &Relation, format: OutputFormat) -> anyhow::Result<bool> {
    let rendered = render_relation(relation, format)?;
    if relation.is_error() {
        eprintln!("{rendered}");
        Ok(false)
    } else {
        println!("{rendered}");
        Ok(true)
    }
}

fn print_status(status: &Status, format: OutputFormat) -> anyhow::Result<bool> {
    let rendered = render_status(status, format)?;
    if status.success {
        println!("{rendered}");
    } else {
        eprintln!("{rendered}");
    }
    Ok(status.success)
}
