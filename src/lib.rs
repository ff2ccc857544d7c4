//! # Due-date Snapshots
//!
//! Point-in-time snapshots of a task-tracking table. Given a source table with
//! a due-date column, two output tables are derived and fully replaced on
//! every run:
//!
//! - `Today`: tasks due on or before the reference date
//! - `Friday`: tasks due on or before the end of the working week (the next
//!   Sunday, inclusive of the reference date)
//!
//! ## Features
//!
//! - **Injected storage**: outputs are written through the [`TableStore`]
//!   trait, with an in-memory store and a DuckDB store provided
//! - **Spreadsheet import**: `.xlsx`, `.xlsm`, `.xlsb`, `.xls` and `.ods`
//!   worksheets load into the source table
//! - **Latest download detection**: `Report (3).xlsx` wins over `Report (2).xlsx`
//! - **Owner allocation**: map every task's studies to their owners
//! - **Due summary**: per-owner counts of flagged, due-today and due-this-week tasks
//! - **Failure isolation**: one output failing never prevents the other
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use due_snapshot::database::memory::MemoryStore;
//! use due_snapshot::database::table::Table;
//! use due_snapshot::spreadsheet::cell::Value;
//! use due_snapshot::{SnapshotConfig, SnapshotOrchestrator};
//!
//! let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let mut store = MemoryStore::new();
//! store.insert(Table::with_header(
//!     "RawData",
//!     &["ID", "Task Due Date"],
//!     vec![vec![Value::Int(1), Value::Date(due)]],
//! ));
//!
//! let mut orchestrator = SnapshotOrchestrator::new(store, SnapshotConfig::default());
//! let report = orchestrator.run(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()).unwrap();
//! assert!(report.is_complete());
//! assert_eq!(orchestrator.store().get("Today").unwrap().data_rows().len(), 1);
//! ```
pub mod database;
pub mod error;
pub mod helpers;
pub mod pipeline;
pub mod report;
pub mod snapshot;
pub mod spreadsheet;

pub use crate::database::{StoreError, TableStore};
pub use crate::error::Error;
pub use crate::pipeline::{run_report, ReportOptions, ReportOutcome};
pub use crate::snapshot::{SnapshotConfig, SnapshotError, SnapshotOrchestrator, SnapshotReport};
