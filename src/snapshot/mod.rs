//! # Due-date Snapshots
//!
//! A snapshot reads the source table once, resolves its due-date column, and
//! materializes two filtered copies of it:
//!
//! * the *today* output: rows due on or before the reference date;
//! * the *week* output: rows due on or before the next week boundary
//!   (Sunday by default, inclusive of the reference date).
//!
//! Missing source tables and missing due columns abort the run before any
//! output is touched. Once both are resolved, each output succeeds or fails
//! on its own and the outcome is recorded in the [`SnapshotReport`].
use crate::database::table::Table;
use crate::database::{StoreError, TableStore};
use crate::spreadsheet::criteria::Criterion;
use chrono::{Local, NaiveDate, Weekday};
use thiserror::Error;
use tracing::{info, warn};

pub mod boundary;
pub mod filter;
pub mod output;
pub mod resolver;

use boundary::next_boundary;
use filter::filter_by;
use output::OutputTableManager;
use resolver::resolve_column;

#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The source table does not exist in the store
    #[error("Source table '{0}' not found")]
    SourceNotFound(String),

    /// No header cell of the source matches the configured column name
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Creating or populating one output table failed
    #[error("Failed to write output table '{output}': {source}")]
    FilterExecutionFailure { output: String, source: StoreError },

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Names and rules of one snapshot run.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotConfig {
    /// Table the outputs are derived from
    pub source_table: String,
    /// Header text of the due-date column, matched case-insensitively
    pub due_column: String,
    /// Output holding rows due on or before the reference date
    pub today_output: String,
    /// Output holding rows due on or before the week boundary
    pub week_output: String,
    /// Last day of the working week
    pub week_boundary: Weekday,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            source_table: "RawData".to_owned(),
            due_column: "Task Due Date".to_owned(),
            today_output: "Today".to_owned(),
            week_output: "Friday".to_owned(),
            week_boundary: Weekday::Sun,
        }
    }
}

/// Row counts of one successfully written output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputCounts {
    pub rows_written: usize,
    /// Rows skipped because their due cell is not a date
    pub malformed: usize,
    /// Rows skipped because their due cell is blank
    pub blank: usize,
}

#[derive(Debug)]
pub struct OutputReport {
    pub name: String,
    pub threshold: NaiveDate,
    pub outcome: Result<OutputCounts, SnapshotError>,
}

#[derive(Debug)]
pub struct SnapshotReport {
    pub source: String,
    pub source_rows: usize,
    pub today: NaiveDate,
    pub week_boundary: NaiveDate,
    pub outputs: Vec<OutputReport>,
}

impl SnapshotReport {
    /// True when every output was written.
    pub fn is_complete(&self) -> bool {
        self.outputs.iter().all(|output| output.outcome.is_ok())
    }

    /// Outputs that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SnapshotError)> {
        self.outputs.iter().filter_map(|output| match &output.outcome {
            Ok(_) => None,
            Err(error) => Some((output.name.as_str(), error)),
        })
    }
}

/// Runs snapshots against an injected [`TableStore`].
pub struct SnapshotOrchestrator<S: TableStore> {
    store: S,
    config: SnapshotConfig,
}

impl<S: TableStore> SnapshotOrchestrator<S> {
    pub fn new(store: S, config: SnapshotConfig) -> Self {
        SnapshotOrchestrator { store, config }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs a snapshot with the local calendar date as reference.
    pub fn run_now(&mut self) -> Result<SnapshotReport, SnapshotError> {
        self.run(Local::now().date_naive())
    }

    /// Runs a snapshot with `today` as reference date.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::SourceNotFound`] and [`SnapshotError::ColumnNotFound`]
    /// abort the run before any output table is dropped or created. Failures
    /// while writing an output are reported per output instead.
    pub fn run(&mut self, today: NaiveDate) -> Result<SnapshotReport, SnapshotError> {
        let config = &self.config;
        let source = match self.store.read_table(&config.source_table) {
            Ok(table) => table,
            Err(StoreError::TableNotFound(name)) => return Err(SnapshotError::SourceNotFound(name)),
            Err(error) => return Err(error.into()),
        };
        let column = resolve_column(&source, &config.due_column)?;
        let week_boundary = next_boundary(today, config.week_boundary);

        if source.is_empty() {
            warn!("Source table {} has no data rows", source.name);
        }

        let mut manager = OutputTableManager::new(&mut self.store, &source.name);
        let mut outputs = Vec::with_capacity(2);
        for (name, threshold) in [
            (&config.today_output, today),
            (&config.week_output, week_boundary),
        ] {
            let outcome = write_output(&mut manager, &source, column, name, threshold);
            match &outcome {
                Ok(counts) => info!(
                    "Wrote {} rows due by {} to {} ({} malformed, {} blank skipped)",
                    counts.rows_written, threshold, name, counts.malformed, counts.blank
                ),
                Err(error) => warn!("{}", error),
            }
            outputs.push(OutputReport {
                name: name.to_owned(),
                threshold,
                outcome,
            });
        }

        Ok(SnapshotReport {
            source: source.name.to_owned(),
            source_rows: source.data_rows().len(),
            today,
            week_boundary,
            outputs,
        })
    }
}

fn write_output<S: TableStore>(
    manager: &mut OutputTableManager<S>,
    source: &Table,
    column: usize,
    name: &str,
    threshold: NaiveDate,
) -> Result<OutputCounts, SnapshotError> {
    let failure = |source| SnapshotError::FilterExecutionFailure {
        output: name.to_owned(),
        source,
    };
    let prepared = manager.prepare(name).map_err(failure)?;
    let view = filter_by(source, &Criterion::at_most(column, threshold));
    let header = source.header().map(Vec::as_slice).unwrap_or_default();
    let rows_written = manager
        .materialize(prepared, header, view.rows())
        .map_err(failure)?;
    Ok(OutputCounts {
        rows_written,
        malformed: view.malformed(),
        blank: view.blank(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::table::Row;
    use crate::spreadsheet::cell::Value;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_with(rows: Vec<Row>) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert(Table::with_header("RawData", &["ID", "Task Due Date"], rows));
        store
    }

    fn ids(store: &MemoryStore, name: &str) -> Vec<Value> {
        store
            .get(name)
            .unwrap()
            .data_rows()
            .iter()
            .map(|row| row[0].clone())
            .collect()
    }

    #[test]
    fn friday_scenario() {
        let store = store_with(vec![
            vec![Value::Int(1), Value::Date(date(2024, 1, 1))],
            vec![Value::Int(2), Value::Date(date(2024, 1, 10))],
        ]);
        let mut orchestrator = SnapshotOrchestrator::new(store, SnapshotConfig::default());
        let report = orchestrator.run(date(2024, 1, 5)).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.week_boundary, date(2024, 1, 7));
        assert_eq!(report.source_rows, 2);
        let store = orchestrator.store();
        assert_eq!(ids(store, "Today"), vec![Value::Int(1)]);
        assert_eq!(ids(store, "Friday"), vec![Value::Int(1)]);
        assert_eq!(
            store.get("Today").unwrap().column_names(),
            vec!["ID", "Task Due Date"]
        );
        assert_eq!(store.table_names().unwrap(), vec!["RawData", "Today", "Friday"]);
    }

    #[test]
    fn week_output_includes_weekend() {
        let store = store_with(vec![
            vec![Value::Int(1), Value::from("2024-01-05")],
            vec![Value::Int(2), Value::from("2024-01-07")],
            vec![Value::Int(3), Value::from("2024-01-08")],
        ]);
        let mut orchestrator = SnapshotOrchestrator::new(store, SnapshotConfig::default());
        orchestrator.run(date(2024, 1, 5)).unwrap();

        let store = orchestrator.store();
        assert_eq!(ids(store, "Today"), vec![Value::Int(1)]);
        assert_eq!(ids(store, "Friday"), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn header_only_source() {
        let mut orchestrator = SnapshotOrchestrator::new(store_with(Vec::new()), SnapshotConfig::default());
        let report = orchestrator.run(date(2024, 1, 5)).unwrap();

        assert!(report.is_complete());
        for output in ["Today", "Friday"] {
            let table = orchestrator.store().get(output).unwrap();
            assert_eq!(table.column_names(), vec!["ID", "Task Due Date"]);
            assert!(table.is_empty());
        }
    }

    #[test]
    fn missing_column_creates_no_outputs() {
        let mut store = MemoryStore::new();
        store.insert(Table::with_header("RawData", &["ID", "Due"], Vec::new()));
        store.insert(Table::new("Today", vec![vec![Value::from("previous")]]));
        let mut orchestrator = SnapshotOrchestrator::new(store, SnapshotConfig::default());

        let error = orchestrator.run(date(2024, 1, 5)).unwrap_err();
        assert!(matches!(error, SnapshotError::ColumnNotFound { .. }));
        let store = orchestrator.store();
        assert_eq!(store.table_names().unwrap(), vec!["RawData", "Today"]);
        assert_eq!(ids(store, "Today"), Vec::<Value>::new());
        assert_eq!(store.get("Today").unwrap().rows(), &[vec![Value::from("previous")]]);
    }

    #[test]
    fn missing_source() {
        let mut orchestrator = SnapshotOrchestrator::new(MemoryStore::new(), SnapshotConfig::default());
        let error = orchestrator.run(date(2024, 1, 5)).unwrap_err();
        assert!(matches!(error, SnapshotError::SourceNotFound(name) if name == "RawData"));
        assert!(orchestrator.store().table_names().unwrap().is_empty());
    }

    #[test]
    fn malformed_due_date_is_excluded() {
        let store = store_with(vec![
            vec![Value::Int(1), Value::Date(date(2024, 1, 2))],
            vec![Value::Int(2), Value::from("next week")],
            vec![Value::Int(3), Value::Empty],
            vec![Value::Int(4), Value::Date(date(2024, 1, 6))],
        ]);
        let mut orchestrator = SnapshotOrchestrator::new(store, SnapshotConfig::default());
        let report = orchestrator.run(date(2024, 1, 5)).unwrap();

        let counts = report.outputs[1].outcome.as_ref().unwrap();
        assert_eq!(
            *counts,
            OutputCounts {
                rows_written: 2,
                malformed: 1,
                blank: 1
            }
        );
        let store = orchestrator.store();
        assert_eq!(ids(store, "Today"), vec![Value::Int(1)]);
        assert_eq!(ids(store, "Friday"), vec![Value::Int(1), Value::Int(4)]);
    }

    #[test]
    fn repeated_runs_are_idempotent() {
        let store = store_with(vec![
            vec![Value::Int(1), Value::Date(date(2024, 1, 1))],
            vec![Value::Int(2), Value::Date(date(2024, 1, 6))],
        ]);
        let mut orchestrator = SnapshotOrchestrator::new(store, SnapshotConfig::default());
        orchestrator.run(date(2024, 1, 5)).unwrap();
        let first = orchestrator.store().clone();
        orchestrator.run(date(2024, 1, 5)).unwrap();
        let second = orchestrator.store();

        assert_eq!(first.table_names().unwrap(), second.table_names().unwrap());
        for name in ["RawData", "Today", "Friday"] {
            assert_eq!(first.get(name), second.get(name));
        }
    }

    #[test]
    fn custom_names() {
        let mut store = MemoryStore::new();
        store.insert(Table::with_header(
            "Tasks",
            &["DUE"],
            vec![vec![Value::Date(date(2024, 1, 4))]],
        ));
        let config = SnapshotConfig {
            source_table: "Tasks".to_owned(),
            due_column: "due".to_owned(),
            today_output: "Now".to_owned(),
            week_output: "ThisWeek".to_owned(),
            week_boundary: Weekday::Fri,
        };
        let mut orchestrator = SnapshotOrchestrator::new(store, config);
        let report = orchestrator.run(date(2024, 1, 3)).unwrap();
        assert_eq!(report.week_boundary, date(2024, 1, 5));
        assert_eq!(
            orchestrator.store().table_names().unwrap(),
            vec!["Tasks", "Now", "ThisWeek"]
        );
    }

    /// Store whose writes to one table always fail.
    struct FailingStore {
        inner: MemoryStore,
        broken: &'static str,
    }

    impl TableStore for FailingStore {
        fn read_table(&self, name: &str) -> Result<Table, StoreError> {
            self.inner.read_table(name)
        }

        fn contains_table(&self, name: &str) -> Result<bool, StoreError> {
            self.inner.contains_table(name)
        }

        fn drop_table(&mut self, name: &str) -> Result<(), StoreError> {
            self.inner.drop_table(name)
        }

        fn create_table(&mut self, name: &str, after: Option<&str>) -> Result<(), StoreError> {
            self.inner.create_table(name, after)
        }

        fn write_table(&mut self, name: &str, header: &[Value], rows: &[&Row]) -> Result<(), StoreError> {
            if name == self.broken {
                return Err(StoreError::NotCreated(name.to_owned()));
            }
            self.inner.write_table(name, header, rows)
        }

        fn table_names(&self) -> Result<Vec<String>, StoreError> {
            self.inner.table_names()
        }
    }

    #[test]
    fn output_failures_are_isolated() {
        let store = FailingStore {
            inner: store_with(vec![vec![Value::Int(1), Value::Date(date(2024, 1, 1))]]),
            broken: "Today",
        };
        let mut orchestrator = SnapshotOrchestrator::new(store, SnapshotConfig::default());
        let report = orchestrator.run(date(2024, 1, 5)).unwrap();

        assert!(!report.is_complete());
        let failures: Vec<_> = report.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["Today"]);
        assert!(matches!(
            report.outputs[0].outcome,
            Err(SnapshotError::FilterExecutionFailure { ref output, .. }) if output == "Today"
        ));
        assert_eq!(ids(&orchestrator.store().inner, "Friday"), vec![Value::Int(1)]);
    }
}
