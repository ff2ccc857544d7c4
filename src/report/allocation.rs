use crate::database::table::Table;
use crate::snapshot::resolver::resolve_column;
use crate::snapshot::SnapshotError;
use crate::spreadsheet::cell::Value;
use std::collections::HashMap;
use tracing::{info, warn};

/// Owner recorded for studies missing from the allocation list.
pub const UNASSIGNED: &str = "NA";

/// Study to owner mapping loaded from an allocation list.
#[derive(Clone, Debug, Default)]
pub struct Allocation {
    owners: HashMap<String, String>,
}

impl Allocation {
    /// Builds the mapping from the first two columns of a header-less table:
    /// study in column A, owner in column B. A blank owner maps to
    /// [`UNASSIGNED`]; rows with a blank study are ignored. Later rows win
    /// over earlier ones for the same study.
    pub fn from_table(table: &Table) -> Self {
        let mut owners = HashMap::new();
        for row in table.rows() {
            let study = row.first().map(ToString::to_string).unwrap_or_default();
            let study = study.trim();
            if study.is_empty() {
                continue;
            }
            let owner = match row.get(1) {
                Some(owner) if !owner.is_blank() => owner.to_string().trim().to_owned(),
                _ => UNASSIGNED.to_owned(),
            };
            owners.insert(study.to_owned(), owner);
        }
        Allocation { owners }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Owner of a single study, [`UNASSIGNED`] when unknown.
    pub fn owner_of(&self, study: &str) -> &str {
        self.owners
            .get(study.trim())
            .map(String::as_str)
            .unwrap_or(UNASSIGNED)
    }

    /// Owners of a study cell. The cell may list several studies separated by
    /// commas; their owners are de-duplicated in first-seen order and joined
    /// with `", "`.
    pub fn owners_of(&self, cell: &Value) -> String {
        if cell.is_blank() {
            return UNASSIGNED.to_owned();
        }
        let mut owners: Vec<&str> = Vec::new();
        for study in cell.to_string().split(',') {
            let owner = self.owner_of(study);
            if !owners.contains(&owner) {
                owners.push(owner);
            }
        }
        owners.join(", ")
    }

    /// Fills `owner_column` of every data row from its `study_column`.
    ///
    /// An existing owner column is overwritten; otherwise it is appended as
    /// the last column. Returns the number of rows assigned.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::ColumnNotFound`] when `study_column` is missing.
    pub fn assign(&self, table: &mut Table, study_column: &str, owner_column: &str) -> Result<usize, SnapshotError> {
        let study = resolve_column(table, study_column)?;
        if table.is_empty() {
            warn!("No data rows in {} to allocate", table.name);
        }
        let owner = match resolve_column(table, owner_column) {
            Ok(index) => index,
            Err(_) => table.push_column(owner_column),
        };
        let rows = table.data_rows_mut();
        for row in rows.iter_mut() {
            row[owner] = Value::Text(self.owners_of(&row[study]));
        }
        info!("Assigned {} to {} rows", owner_column, rows.len());
        Ok(rows.len())
    }
}
