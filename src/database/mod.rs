//! # Table Stores
//!
//! The host data store is injected as a [`TableStore`]: something that can
//! hand out a source table by name and drop, create and fill named output
//! tables. Two stores ship with the crate: [`memory::MemoryStore`] keeps
//! ordered tables in memory, [`duck::DuckDbStore`] keeps them in a DuckDB
//! database.
use crate::database::table::{Row, Table};
use crate::spreadsheet::cell::Value;
use thiserror::Error;

pub mod column;
pub mod duck;
pub mod memory;
pub mod table;

/// Errors raised by a [`TableStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// No table with this name exists in the store
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// A write targeted a table that was never created
    #[error("Table '{0}' has not been created")]
    NotCreated(String),

    #[error("{0}")]
    DuckDBError(#[from] duckdb::Error),
}

/// Read/write access to the named tables of a host data store.
pub trait TableStore {
    /// Reads a whole table, header row first.
    fn read_table(&self, name: &str) -> Result<Table, StoreError>;

    /// Returns true if a table named `name` exists.
    fn contains_table(&self, name: &str) -> Result<bool, StoreError>;

    /// Drops the table named `name`. Dropping a missing table is not an error.
    fn drop_table(&mut self, name: &str) -> Result<(), StoreError>;

    /// Creates an empty table named `name`, positioned right after `after`
    /// when the store keeps an order and `after` exists.
    fn create_table(&mut self, name: &str, after: Option<&str>) -> Result<(), StoreError>;

    /// Writes the header followed by `rows` into a table created by
    /// [`TableStore::create_table`]. Rows are already aligned to the header.
    fn write_table(&mut self, name: &str, header: &[Value], rows: &[&Row]) -> Result<(), StoreError>;

    /// Names of all tables in store order.
    fn table_names(&self) -> Result<Vec<String>, StoreError>;

    /// Replaces the content of the table named `name`, creating it when
    /// missing. Stores that keep an order leave an existing table where it is.
    fn replace_table(&mut self, name: &str, header: &[Value], rows: &[&Row]) -> Result<(), StoreError> {
        self.drop_table(name)?;
        self.create_table(name, None)?;
        self.write_table(name, header, rows)
    }
}

impl<T: TableStore + ?Sized> TableStore for &mut T {
    fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        (**self).read_table(name)
    }

    fn contains_table(&self, name: &str) -> Result<bool, StoreError> {
        (**self).contains_table(name)
    }

    fn drop_table(&mut self, name: &str) -> Result<(), StoreError> {
        (**self).drop_table(name)
    }

    fn create_table(&mut self, name: &str, after: Option<&str>) -> Result<(), StoreError> {
        (**self).create_table(name, after)
    }

    fn write_table(&mut self, name: &str, header: &[Value], rows: &[&Row]) -> Result<(), StoreError> {
        (**self).write_table(name, header, rows)
    }

    fn table_names(&self) -> Result<Vec<String>, StoreError> {
        (**self).table_names()
    }

    fn replace_table(&mut self, name: &str, header: &[Value], rows: &[&Row]) -> Result<(), StoreError> {
        (**self).replace_table(name, header, rows)
    }
}
