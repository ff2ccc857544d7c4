use crate::database::table::Row;
use crate::database::{StoreError, TableStore};
use crate::spreadsheet::cell::Value;
use std::borrow::Cow;
use tracing::debug;

/// An output table that has been dropped and recreated empty, ready to be
/// filled by [`OutputTableManager::materialize`].
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct PreparedTable {
    name: String,
}

impl PreparedTable {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Owns the lifecycle of named output tables in a [`TableStore`]:
/// drop if present, create empty, then populate.
///
/// Each prepared table is placed right after the previous one, starting
/// after the anchor table (normally the source), so repeated runs keep the
/// same table order.
pub struct OutputTableManager<'s, S: TableStore> {
    store: &'s mut S,
    anchor: String,
}

impl<'s, S: TableStore> OutputTableManager<'s, S> {
    pub fn new(store: &'s mut S, anchor: &str) -> Self {
        OutputTableManager {
            store,
            anchor: anchor.to_owned(),
        }
    }

    /// Drops any existing table named `name` and creates it again, empty.
    pub fn prepare(&mut self, name: &str) -> Result<PreparedTable, StoreError> {
        self.store.drop_table(name)?;
        let after = (self.anchor != name).then_some(self.anchor.as_str());
        self.store.create_table(name, after)?;
        debug!("Prepared output table {}", name);
        self.anchor = name.to_owned();
        Ok(PreparedTable {
            name: name.to_owned(),
        })
    }

    /// Writes `header` followed by `rows` into a prepared table and returns
    /// the number of data rows written. Rows are padded with blanks or
    /// truncated to the header width.
    pub fn materialize(
        &mut self,
        prepared: PreparedTable,
        header: &[Value],
        rows: &[&Row],
    ) -> Result<usize, StoreError> {
        let width = header.len();
        let aligned: Vec<Cow<Row>> = rows
            .iter()
            .map(|row| {
                if row.len() == width {
                    Cow::Borrowed(*row)
                } else {
                    let mut row = (*row).clone();
                    row.resize(width, Value::Empty);
                    Cow::Owned(row)
                }
            })
            .collect();
        let aligned: Vec<&Row> = aligned.iter().map(|row| &**row).collect();
        self.store.write_table(&prepared.name, header, &aligned)?;
        Ok(aligned.len())
    }

    /// Replaces the table named `name` with `header` and `rows`.
    pub fn replace(&mut self, name: &str, header: &[Value], rows: &[&Row]) -> Result<usize, StoreError> {
        let prepared = self.prepare(name)?;
        self.materialize(prepared, header, rows)
    }
}
