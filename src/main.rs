use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Weekday};
use clap::Parser;
use due_snapshot::database::duck::DuckDbStore;
use due_snapshot::report::summary::SummaryConfig;
use due_snapshot::{run_report, ReportOptions, SnapshotConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Build today's and this week's due-task snapshots in a DuckDB database
#[derive(Parser, Debug)]
#[command(name = "due-snapshot")]
#[command(version, about, long_about = None)]
struct Args {
    /// DuckDB database file holding the source and output tables
    #[arg(long)]
    database: PathBuf,

    /// Directory searched for the workbook and allocation list
    #[arg(long, default_value = ".")]
    directory: PathBuf,

    /// Workbook to import into the source table (latest numbered copy wins)
    #[arg(long)]
    workbook: Option<String>,

    /// Worksheet to import
    #[arg(long, default_value = "Sheet0")]
    sheet: String,

    /// Study to owner allocation list (latest numbered copy wins)
    #[arg(long)]
    allocation: Option<String>,

    /// Column listing the studies of a task
    #[arg(long, default_value = "Study")]
    study_column: String,

    /// Column receiving the allocated owners
    #[arg(long, default_value = "RQC User")]
    owner_column: String,

    #[arg(long, default_value = "RawData")]
    source_table: String,

    #[arg(long, default_value = "Task Due Date")]
    due_column: String,

    #[arg(long, default_value = "Today")]
    today_output: String,

    #[arg(long, default_value = "Friday")]
    week_output: String,

    /// Last day of the working week
    #[arg(long, default_value = "Sun")]
    week_boundary: Weekday,

    #[arg(long, default_value = "Pivot_Summary")]
    summary_output: String,

    /// Skip the per-owner summary table
    #[arg(long)]
    no_summary: bool,

    /// Reference date (YYYY-MM-DD), defaults to the local date
    #[arg(long)]
    today: Option<NaiveDate>,
}

impl Args {
    fn options(&self) -> ReportOptions {
        ReportOptions {
            directory: self.directory.clone(),
            workbook: self.workbook.clone(),
            sheet: Some(self.sheet.clone()),
            allocation: self.allocation.clone(),
            study_column: self.study_column.clone(),
            snapshot: SnapshotConfig {
                source_table: self.source_table.clone(),
                due_column: self.due_column.clone(),
                today_output: self.today_output.clone(),
                week_output: self.week_output.clone(),
                week_boundary: self.week_boundary,
            },
            summary: SummaryConfig {
                owner_column: self.owner_column.clone(),
                due_column: self.due_column.clone(),
                ..SummaryConfig::default()
            },
            summary_output: (!self.no_summary).then(|| self.summary_output.clone()),
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let mut store = DuckDbStore::open(&args.database)
        .with_context(|| format!("failed to open database {}", args.database.display()))?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    info!("Running snapshot for {} in {}", today, args.database.display());

    let outcome = run_report(&mut store, &args.options(), today).context("snapshot run failed")?;
    let snapshot = &outcome.snapshot;
    info!(
        "Snapshot of {} ({} rows), week ends {}",
        snapshot.source, snapshot.source_rows, snapshot.week_boundary
    );
    for (name, error) in snapshot.failures() {
        warn!("Output {} failed: {}", name, error);
    }
    if let Some(Ok(owners)) = &outcome.summary {
        info!("Summary written for {} owners", owners);
    }
    // Summary failures are warnings only.
    Ok(snapshot.is_complete())
}

fn main() -> ExitCode {
    fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
