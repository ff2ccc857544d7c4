use crate::spreadsheet::cell::Value;

/// One table row: cell values aligned to the header's columns.
pub type Row = Vec<Value>;

/// A named table. Row 0 is the header row, the rest are data rows.
///
/// Every row has the same column count as the header; [`Table::new`] pads
/// short rows (and a short header) with [`Value::Empty`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    /// Table/sheet name
    pub name: String,
    rows: Vec<Row>,
}

impl Table {
    /// Creates a table from raw rows, normalizing every row to the widest one.
    pub fn new(name: &str, mut rows: Vec<Row>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows.iter_mut() {
            row.resize(width, Value::Empty);
        }
        Table {
            name: name.to_owned(),
            rows,
        }
    }

    /// Creates a table with a text header and the given data rows.
    pub fn with_header<S: AsRef<str>>(name: &str, header: &[S], data: Vec<Row>) -> Self {
        let header: Row = header
            .iter()
            .map(|title| Value::Text(title.as_ref().to_owned()))
            .collect();
        let mut rows = Vec::with_capacity(data.len() + 1);
        rows.push(header);
        rows.extend(data);
        Table::new(name, rows)
    }

    /// The header row, if the table has any rows at all.
    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Column names as displayed text.
    pub fn column_names(&self) -> Vec<String> {
        self.header()
            .map(|header| header.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Number of columns (the header's width).
    pub fn width(&self) -> usize {
        self.header().map(Vec::len).unwrap_or(0)
    }

    /// Data rows, header excluded.
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// All rows including the header.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Mutable access to the data rows, header excluded.
    pub(crate) fn data_rows_mut(&mut self) -> &mut [Row] {
        self.rows.get_mut(1..).unwrap_or(&mut [])
    }

    /// Appends a column with the given header, filling data rows with empties.
    /// Returns the index of the new column.
    pub(crate) fn push_column(&mut self, title: &str) -> usize {
        let index = self.width();
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        for (position, row) in self.rows.iter_mut().enumerate() {
            row.push(if position == 0 {
                Value::Text(title.to_owned())
            } else {
                Value::Empty
            });
        }
        index
    }

    /// True when there are no data rows (header-only or entirely empty).
    pub fn is_empty(&self) -> bool {
        self.data_rows().is_empty()
    }
}
