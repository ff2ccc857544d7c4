use crate::database::table::{Row, Table};
use crate::spreadsheet::cell::Value;
use crate::spreadsheet::criteria::{Criterion, FromValue};
use crate::spreadsheet::reference::cell_position;
use tracing::debug;

/// A borrowed selection of a table's data rows, in source order.
///
/// Building a view never touches the source table.
#[derive(Clone, Debug, Default)]
pub struct RowView<'a> {
    rows: Vec<&'a Row>,
    malformed: usize,
    blank: usize,
}

impl<'a> RowView<'a> {
    /// Selected rows, in the order they appear in the source.
    pub fn rows(&self) -> &[&'a Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows skipped because their key cell could not be read.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Rows skipped because their key cell was blank.
    pub fn blank(&self) -> usize {
        self.blank
    }
}

/// Selects the data rows of `table` whose cell in `column` satisfies `predicate`.
///
/// Blank cells never match. A cell the predicate cannot read (it returns
/// `Err`) is logged and skipped; it never aborts the scan.
pub fn filter_rows<'a, F>(table: &'a Table, column: usize, mut predicate: F) -> RowView<'a>
where
    F: FnMut(&Value) -> Result<bool, String>,
{
    let mut view = RowView::default();
    for (index, row) in table.data_rows().iter().enumerate() {
        let cell = row.get(column).unwrap_or(&Value::Empty);
        if cell.is_blank() {
            view.blank += 1;
            continue;
        }
        match predicate(cell) {
            Ok(true) => view.rows.push(row),
            Ok(false) => {}
            Err(reason) => {
                view.malformed += 1;
                debug!(
                    "Skipping {}!{}: {}",
                    table.name,
                    cell_position(index + 1, column),
                    reason
                );
            }
        }
    }
    view
}

/// Selects the data rows matching a typed [`Criterion`].
pub fn filter_by<'a, T>(table: &'a Table, criterion: &Criterion<T>) -> RowView<'a>
where
    T: FromValue + PartialOrd,
{
    filter_rows(table, criterion.column, |cell| criterion.evaluate(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::criteria::Comparison;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn source() -> Table {
        Table::with_header(
            "RawData",
            &["ID", "Task Due Date"],
            vec![
                vec![Value::Int(1), Value::Date(date(2024, 1, 3))],
                vec![Value::Int(2), Value::Date(date(2024, 1, 5))],
                vec![Value::Int(3), Value::Date(date(2024, 1, 6))],
                vec![Value::Int(4), Value::Date(date(2024, 1, 8))],
                vec![Value::Int(5), Value::from("TBD")],
                vec![Value::Int(6), Value::Empty],
                vec![Value::Int(7), Value::from("2024-01-02")],
            ],
        )
    }

    fn ids(view: &RowView) -> Vec<Value> {
        view.rows().iter().map(|row| row[0].clone()).collect()
    }

    #[test]
    fn keeps_matching_rows_in_order() {
        let table = source();
        let view = filter_by(&table, &Criterion::at_most(1, date(2024, 1, 5)));
        assert_eq!(ids(&view), vec![Value::Int(1), Value::Int(2), Value::Int(7)]);
        assert_eq!(view.malformed(), 1);
        assert_eq!(view.blank(), 1);
    }

    #[test]
    fn later_threshold_is_a_superset() {
        let table = source();
        let today = filter_by(&table, &Criterion::at_most(1, date(2024, 1, 5)));
        let week = filter_by(&table, &Criterion::at_most(1, date(2024, 1, 7)));
        assert_eq!(ids(&week), vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(7)]);
        for row in today.rows() {
            assert!(week.rows().contains(row));
        }
    }

    #[test]
    fn source_is_untouched() {
        let table = source();
        let before = table.clone();
        let view = filter_by(&table, &Criterion::new(1, Comparison::Gt, date(2024, 1, 5)));
        assert_eq!(view.len(), 2);
        assert_eq!(table, before);
    }

    #[test]
    fn header_only_yields_empty_view() {
        let table = Table::with_header("RawData", &["ID", "Task Due Date"], Vec::new());
        let view = filter_by(&table, &Criterion::at_most(1, date(2024, 1, 5)));
        assert!(view.is_empty());
        assert_eq!(view.malformed(), 0);
    }

    #[test]
    fn custom_predicate() {
        let table = source();
        let view = filter_rows(&table, 0, |cell| Ok(cell.to_bigint()? % 2 == 0));
        assert_eq!(ids(&view), vec![Value::Int(2), Value::Int(4), Value::Int(6)]);
    }
}
