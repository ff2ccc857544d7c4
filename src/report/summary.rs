use crate::database::table::{Row, Table};
use crate::database::{StoreError, TableStore};
use crate::snapshot::output::OutputTableManager;
use crate::snapshot::resolver::resolve_column;
use crate::snapshot::SnapshotError;
use crate::spreadsheet::cell::Value;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Column names read by [`DueSummary::compute`].
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryConfig {
    /// Column rows are grouped by
    pub owner_column: String,
    pub due_column: String,
    /// Column searched for [`SummaryConfig::flag`]
    pub content_column: String,
    /// Text counted in the content column, case-insensitive
    pub flag: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        SummaryConfig {
            owner_column: "RQC User".to_owned(),
            due_column: "Task Due Date".to_owned(),
            content_column: "Content".to_owned(),
            flag: "Unblinded".to_owned(),
        }
    }
}

/// Counts for one owner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnerCounts {
    pub owner: String,
    /// Rows whose content mentions the flag
    pub flagged: usize,
    pub due_today: usize,
    pub due_by_week: usize,
}

/// Per-owner summary of due work, sorted by owner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DueSummary {
    pub owner_header: String,
    pub flag_header: String,
    pub owners: Vec<OwnerCounts>,
}

impl DueSummary {
    /// Groups the data rows of `table` by owner and counts flagged rows, rows
    /// due by `today` and rows due by `week_boundary`. Rows with a blank owner
    /// are left out. Due cells that are not dates count towards neither due
    /// column.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::ColumnNotFound`] when the owner or due column is
    /// missing. A missing content column only disables the flag count.
    pub fn compute(
        table: &Table,
        config: &SummaryConfig,
        today: NaiveDate,
        week_boundary: NaiveDate,
    ) -> Result<Self, SnapshotError> {
        let owner = resolve_column(table, &config.owner_column)?;
        let due = resolve_column(table, &config.due_column)?;
        let content = match resolve_column(table, &config.content_column) {
            Ok(index) => Some(index),
            Err(error) => {
                warn!("{}; {} count will be 0", error, config.flag);
                None
            }
        };
        let flag = config.flag.to_lowercase();

        let mut groups: BTreeMap<String, OwnerCounts> = BTreeMap::new();
        for row in table.data_rows() {
            if row[owner].is_blank() {
                continue;
            }
            let name = row[owner].to_string();
            let counts = groups.entry(name.to_owned()).or_insert_with(|| OwnerCounts {
                owner: name,
                ..OwnerCounts::default()
            });
            if content.is_some_and(|content| row[content].to_string().to_lowercase().contains(&flag)) {
                counts.flagged += 1;
            }
            if let Ok(date) = row[due].to_date() {
                if date <= today {
                    counts.due_today += 1;
                }
                if date <= week_boundary {
                    counts.due_by_week += 1;
                }
            }
        }

        Ok(DueSummary {
            owner_header: table.column_names()[owner].to_owned(),
            flag_header: config.flag.to_owned(),
            owners: groups.into_values().collect(),
        })
    }

    /// Header row of the rendered summary.
    pub fn header(&self) -> Row {
        vec![
            Value::from(self.owner_header.as_str()),
            Value::from(self.flag_header.as_str()),
            Value::from("Due By Today"),
            Value::from("Due By Friday"),
        ]
    }

    /// Renders the summary as a table, one row per owner.
    pub fn to_table(&self, name: &str) -> Table {
        let mut rows = Vec::with_capacity(self.owners.len() + 1);
        rows.push(self.header());
        rows.extend(self.owners.iter().map(|counts| {
            vec![
                Value::from(counts.owner.as_str()),
                Value::Int(counts.flagged as i64),
                Value::Int(counts.due_today as i64),
                Value::Int(counts.due_by_week as i64),
            ]
        }));
        Table::new(name, rows)
    }

    /// Replaces the output table `name` with the rendered summary.
    pub fn write<S: TableStore>(&self, manager: &mut OutputTableManager<S>, name: &str) -> Result<usize, StoreError> {
        let table = self.to_table(name);
        let rows: Vec<&Row> = table.data_rows().iter().collect();
        let written = manager.replace(name, &self.header(), &rows)?;
        info!("Wrote summary of {} owners to {}", written, name);
        Ok(written)
    }
}
