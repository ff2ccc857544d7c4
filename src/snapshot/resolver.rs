use crate::database::table::Table;
use crate::snapshot::SnapshotError;

/// Finds the 0-based index of the header cell whose text equals `header_name`,
/// ignoring case. Only the header row is scanned and the first match wins.
///
/// # Errors
///
/// [`SnapshotError::ColumnNotFound`] when the table has no header row or no
/// header cell matches.
pub fn resolve_column(table: &Table, header_name: &str) -> Result<usize, SnapshotError> {
    let wanted = header_name.to_lowercase();
    table
        .header()
        .and_then(|header| {
            header
                .iter()
                .position(|cell| cell.to_string().to_lowercase() == wanted)
        })
        .ok_or_else(|| SnapshotError::ColumnNotFound {
            table: table.name.to_owned(),
            column: header_name.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::Value;

    fn table(header: &[&str]) -> Table {
        Table::with_header("RawData", header, Vec::new())
    }

    #[test]
    fn resolves_case_insensitively() {
        for header in ["Task Due Date", "TASK DUE DATE", "task due date"] {
            let table = table(&["ID", header, "Owner"]);
            assert_eq!(resolve_column(&table, "Task Due Date").unwrap(), 1);
        }
        let table = table(&["ID", "Task Due Date"]);
        assert_eq!(resolve_column(&table, "TASK due DATE").unwrap(), 1);
    }

    #[test]
    fn first_match_wins() {
        let table = table(&["Task Due Date", "ID", "task due date"]);
        assert_eq!(resolve_column(&table, "Task Due Date").unwrap(), 0);
    }

    #[test]
    fn whole_value_only() {
        let table = table(&["ID", "Original Task Due Date", "Task Due"]);
        let error = resolve_column(&table, "Task Due Date").unwrap_err();
        assert!(matches!(
            error,
            SnapshotError::ColumnNotFound { ref table, ref column }
                if table == "RawData" && column == "Task Due Date"
        ));
    }

    #[test]
    fn data_rows_are_not_scanned() {
        let table = Table::with_header(
            "RawData",
            &["ID", "Due"],
            vec![vec![Value::Int(1), Value::from("Task Due Date")]],
        );
        assert!(resolve_column(&table, "Task Due Date").is_err());
    }

    #[test]
    fn empty_table_has_no_columns() {
        let table = Table::new("RawData", Vec::new());
        assert!(matches!(
            resolve_column(&table, "Task Due Date"),
            Err(SnapshotError::ColumnNotFound { .. })
        ));
    }
}
