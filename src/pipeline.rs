//! # Report Pipeline
//!
//! Wires the pieces into one run: optionally load the latest downloaded
//! workbook into the source table and allocate owners, take the due-date
//! snapshot, then write the per-owner summary.
use crate::database::table::{Row, Table};
use crate::database::TableStore;
use crate::error::{Error, ResultMessage};
use crate::helpers::locate::find_latest_file;
use crate::report::allocation::Allocation;
use crate::report::summary::{DueSummary, SummaryConfig};
use crate::snapshot::output::OutputTableManager;
use crate::snapshot::{SnapshotConfig, SnapshotError, SnapshotOrchestrator, SnapshotReport};
use crate::spreadsheet::Spreadsheet;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything a pipeline run needs besides the store and the date.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    /// Directory searched for the workbook and the allocation list
    pub directory: PathBuf,
    /// Workbook file name; the newest numbered download wins
    pub workbook: Option<String>,
    /// Worksheet to import, the first one when unset
    pub sheet: Option<String>,
    /// Study to owner allocation list file name
    pub allocation: Option<String>,
    pub study_column: String,
    pub snapshot: SnapshotConfig,
    pub summary: SummaryConfig,
    /// Output table of the per-owner summary; no summary when unset
    pub summary_output: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            directory: PathBuf::from("."),
            workbook: None,
            sheet: Some("Sheet0".to_owned()),
            allocation: None,
            study_column: "Study".to_owned(),
            snapshot: SnapshotConfig::default(),
            summary: SummaryConfig::default(),
            summary_output: Some("Pivot_Summary".to_owned()),
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct ReportOutcome {
    pub snapshot: SnapshotReport,
    /// Owners written to the summary table, or why it could not be written.
    /// `None` when no summary was requested.
    pub summary: Option<Result<usize, Error>>,
}

impl ReportOutcome {
    /// Whether every snapshot output and the summary (if requested) were written.
    pub fn is_complete(&self) -> bool {
        self.snapshot.is_complete() && !matches!(self.summary, Some(Err(_)))
    }
}

/// Runs the whole pipeline against `store` with `today` as reference date.
///
/// # Errors
///
/// Fails when an input file cannot be found or read, when the source table
/// or a required column is missing, or when the source table cannot be
/// written. Failures of individual snapshot outputs are reported in
/// [`ReportOutcome::snapshot`] and a failed summary in
/// [`ReportOutcome::summary`] instead.
pub fn run_report<S: TableStore>(
    store: &mut S,
    options: &ReportOptions,
    today: NaiveDate,
) -> Result<ReportOutcome, Error> {
    let source_name = options.snapshot.source_table.as_str();
    let mut source = match &options.workbook {
        Some(workbook) => Some(load_workbook(&options.directory, workbook, options.sheet.as_deref(), source_name)?),
        None => None,
    };

    if let Some(allocation) = &options.allocation {
        let allocation = load_allocation(&options.directory, allocation)?;
        let mut table = match source.take() {
            Some(table) => table,
            None => read_source(store, source_name)?,
        };
        allocation
            .assign(&mut table, &options.study_column, &options.summary.owner_column)
            .map_err(Error::from)
            .with_prefix("Failed to allocate owners")?;
        source = Some(table);
    }

    if let Some(table) = &source {
        let rows: Vec<&Row> = table.data_rows().iter().collect();
        let header = table.header().cloned().unwrap_or_default();
        store
            .replace_table(source_name, &header, &rows)
            .map_err(Error::from)
            .with_prefix(&format!("Failed to write source table {}", source_name))?;
        info!("Loaded {} rows into {}", rows.len(), source_name);
    }

    let snapshot = SnapshotOrchestrator::new(&mut *store, options.snapshot.clone()).run(today)?;

    let summary = options.summary_output.as_deref().map(|output| {
        let written = write_summary(store, options, &snapshot, output);
        if let Err(error) = &written {
            warn!("Summary table {} was not written: {}", output, error);
        }
        written
    });

    Ok(ReportOutcome { snapshot, summary })
}

fn write_summary<S: TableStore>(
    store: &mut S,
    options: &ReportOptions,
    snapshot: &SnapshotReport,
    output: &str,
) -> Result<usize, Error> {
    let table = read_source(store, &options.snapshot.source_table)?;
    let summary = DueSummary::compute(&table, &options.summary, snapshot.today, snapshot.week_boundary)?;
    let mut manager = OutputTableManager::new(store, &options.snapshot.week_output);
    summary
        .write(&mut manager, output)
        .map_err(Error::from)
        .with_prefix(&format!("Failed to write summary table {}", output))
}

fn locate(directory: &Path, name: &str) -> Result<PathBuf, Error> {
    find_latest_file(directory, name)?.ok_or_else(|| Error::FileNotFound {
        name: name.to_owned(),
        directory: directory.display().to_string(),
    })
}

fn load_workbook(directory: &Path, name: &str, sheet: Option<&str>, table_name: &str) -> Result<Table, Error> {
    let path = locate(directory, name)?;
    info!("Reading workbook {}", path.display());
    Spreadsheet::open(&path)
        .and_then(|mut workbook| workbook.read_table(sheet, table_name, true))
        .map_err(Error::from)
        .with_prefix(&format!("Failed to read {}", path.display()))
}

fn load_allocation(directory: &Path, name: &str) -> Result<Allocation, Error> {
    let path = locate(directory, name)?;
    let table = Spreadsheet::open(&path)
        .and_then(|mut workbook| workbook.read_table(None, "Allocation", true))
        .map_err(Error::from)
        .with_prefix(&format!("Failed to read {}", path.display()))?;
    let allocation = Allocation::from_table(&table);
    info!("Loaded {} study allocations from {}", allocation.len(), path.display());
    Ok(allocation)
}

fn read_source<S: TableStore>(store: &S, name: &str) -> Result<Table, Error> {
    match store.read_table(name) {
        Ok(table) => Ok(table),
        Err(crate::database::StoreError::TableNotFound(name)) => Err(SnapshotError::SourceNotFound(name).into()),
        Err(error) => Err(error.into()),
    }
}
