// src/main.rs
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::{fs, path::PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timesheet_core::{
    aggregate, filter, normalize_all, summarize_by_project, week_range, write_weeks_csv, Config,
    DayEntry, FilterCriteria, HttpTimesheetApi, RawRecord, Session, TimesheetBoard, TimesheetScope,
    TimesheetStatus, WeekBucket, WeeklySubmission,
};

#[derive(Parser)]
#[command(name = "timesheet")]
#[command(about = "Weekly timesheet review, approval and export", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the Monday to Sunday week containing a date
    Week { date: NaiveDate },

    /// List weekly buckets
    Weeks {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        criteria: FilterArgs,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Hours per project and employee
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        criteria: FilterArgs,
    },

    /// Write weekly buckets to a CSV file
    Export {
        file: PathBuf,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        criteria: FilterArgs,
    },

    /// Approve one day entry
    Approve { id: String },

    /// Reject one day entry
    Reject {
        id: String,
        #[arg(long)]
        reason: String,
    },

    /// Submit hours for one project week, e.g. --day 2025-04-07=8 --note 2025-04-07=Kickoff
    Submit {
        #[arg(long)]
        project: String,
        /// Any date inside the week
        #[arg(long)]
        week: NaiveDate,
        #[arg(long = "day", value_parser = parse_date_pair)]
        days: Vec<(NaiveDate, String)>,
        #[arg(long = "note", value_parser = parse_date_pair)]
        notes: Vec<(NaiveDate, String)>,
    },

    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the persisted session
    Logout,
}

#[derive(Args)]
struct SourceArgs {
    /// Read raw records from a JSON file instead of the API
    #[arg(long)]
    input: Option<PathBuf>,
    /// Load the manager's pending weeks from the grouped listing
    #[arg(long, conflicts_with = "input")]
    pending: bool,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    project: Option<String>,
    #[arg(long)]
    employee: Option<String>,
    /// PENDING, APPROVED or REJECTED
    #[arg(long)]
    status: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    from: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    to: Option<String>,
}

impl FilterArgs {
    fn criteria(&self) -> Result<FilterCriteria> {
        Ok(FilterCriteria::from_form(
            self.project.as_deref(),
            self.employee.as_deref(),
            self.status.as_deref(),
            self.from.as_deref(),
            self.to.as_deref(),
        )?)
    }
}

fn parse_date_pair(raw: &str) -> Result<(NaiveDate, String), String> {
    let (date, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DATE=VALUE, got '{}'", raw))?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {}", date, e))?;
    Ok((date, value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    debug!("Configuration: {:?}", config);

    let cli = Cli::parse();
    match cli.command {
        Commands::Week { date } => {
            let range = week_range(date)?;
            println!("{} .. {}", range.week_start, range.week_end);
            for day in range.days {
                println!("  {} {}", day.format("%a"), day);
            }
        }
        Commands::Weeks {
            source,
            criteria,
            json,
        } => {
            let entries = load_entries(&config, &source).await?;
            let buckets = filter(&aggregate(&entries), &criteria.criteria()?);
            if json {
                println!("{}", serde_json::to_string_pretty(&buckets)?);
            } else {
                print_weeks(&buckets);
            }
        }
        Commands::Summary { source, criteria } => {
            let entries = load_entries(&config, &source).await?;
            for project in summarize_by_project(&filter(&entries, &criteria.criteria()?)) {
                println!(
                    "{} {}: {}h",
                    project.project_id,
                    project.project_name.as_deref().unwrap_or(""),
                    project.total_hours.normalize()
                );
                for employee in &project.employees {
                    println!(
                        "    {} {}: {}h over {} day(s)",
                        employee.employee_id,
                        employee.employee_name.as_deref().unwrap_or(""),
                        employee.total_hours.normalize(),
                        employee.entry_count
                    );
                }
            }
        }
        Commands::Export {
            file,
            source,
            criteria,
        } => {
            let entries = load_entries(&config, &source).await?;
            let buckets = filter(&aggregate(&entries), &criteria.criteria()?);
            let out = fs::File::create(&file)
                .with_context(|| format!("Failed to create export file {:?}", file))?;
            let rows = write_weeks_csv(out, &buckets)?;
            info!("Exported {} week(s) to {:?}", rows, file);
        }
        Commands::Approve { id } => {
            let mut board = review_board(&config).await?;
            let entry = board.approve(&id).await?;
            println!("{} {} {}", entry.id, entry.date, entry.status);
        }
        Commands::Reject { id, reason } => {
            let mut board = review_board(&config).await?;
            let entry = board.reject(&id, &reason).await?;
            println!(
                "{} {} {} ({})",
                entry.id,
                entry.date,
                entry.status,
                entry.rejection_reason.as_deref().unwrap_or_default()
            );
        }
        Commands::Submit {
            project,
            week,
            days,
            notes,
        } => {
            let session = require_session(&config)?;
            let mut draft = WeeklySubmission::for_week(Some(project.as_str()), week)?;
            for (date, hours) in &days {
                draft.set_hours(*date, hours);
            }
            for (date, note) in &notes {
                draft.set_notes(*date, note);
            }
            let user = session.user.clone();
            let api = HttpTimesheetApi::new(&config.api_base_url, session, config.request_timeout())?;
            let mut board = TimesheetBoard::new(api);
            let receipt = board.submit(&draft, Local::now().date_naive(), &user).await?;
            println!(
                "Submitted {}h: {} entry id(s) {}",
                draft.total_hours().normalize(),
                receipt.created.len() + receipt.unassigned,
                receipt.created.join(", ")
            );
        }
        Commands::Login { email, password } => {
            let session =
                HttpTimesheetApi::login(&config.api_base_url, &email, &password, config.request_timeout())
                    .await?;
            session.persist(&config.session_file)?;
            println!("Logged in as {} ({})", session.user.name, session.user.role);
        }
        Commands::Logout => {
            Session::clear(&config.session_file)?;
            println!("Logged out");
        }
    }
    Ok(())
}

fn require_session(config: &Config) -> Result<Session> {
    Session::load(&config.session_file)?
        .ok_or_else(|| anyhow!("Not logged in, run `timesheet login` first"))
}

async fn load_entries(config: &Config, source: &SourceArgs) -> Result<Vec<DayEntry>> {
    if let Some(path) = &source.input {
        let json_string =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let records: Vec<RawRecord> = serde_json::from_str(&json_string)
            .with_context(|| format!("{:?} is not a JSON array of timesheet records", path))?;
        return Ok(normalize_all(&records).entries);
    }

    let session = require_session(config)?;
    if source.pending && !session.user.is_manager() {
        bail!("Role {} has no pending week listing", session.user.role);
    }
    let scope = TimesheetScope::for_identity(&session.user, None);
    let api = HttpTimesheetApi::new(&config.api_base_url, session, config.request_timeout())?;
    let mut board = TimesheetBoard::new(api);
    if source.pending {
        board.load_pending().await?;
    } else {
        board.load(&scope).await?;
    }
    Ok(board.entries().to_vec())
}

/// Board loaded with everything the logged-in reviewer can act on.
async fn review_board(config: &Config) -> Result<TimesheetBoard<HttpTimesheetApi>> {
    let session = require_session(config)?;
    if !(session.user.is_manager() || session.user.is_admin()) {
        bail!("Role {} cannot approve or reject timesheets", session.user.role);
    }
    let manager = session.user.is_manager();
    let scope = TimesheetScope::for_identity(&session.user, None);
    let api = HttpTimesheetApi::new(&config.api_base_url, session, config.request_timeout())?;
    let mut board = TimesheetBoard::new(api);
    if manager {
        board.load_pending().await?;
    } else {
        board.load(&scope).await?;
    }
    Ok(board)
}

fn print_weeks(buckets: &[WeekBucket]) {
    if buckets.is_empty() {
        println!("No weeks match");
        return;
    }
    for bucket in buckets {
        let marker = match bucket.overall_status {
            TimesheetStatus::Approved => "+",
            TimesheetStatus::Rejected => "x",
            TimesheetStatus::Pending => " ",
        };
        println!(
            "[{}] {} .. {}  {:<20} {:<20} {:>6}h  {} day(s)  {}",
            marker,
            bucket.week_start,
            bucket.week_end,
            bucket.employee_name.as_deref().unwrap_or(&bucket.employee_id),
            bucket.project_name.as_deref().unwrap_or(&bucket.project_id),
            bucket.total_hours.normalize().to_string(),
            bucket.days.len(),
            bucket.overall_status
        );
    }
}
