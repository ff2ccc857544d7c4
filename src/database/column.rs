use crate::spreadsheet::cell::Value;

/// Column data types used when a table is materialized in a SQL store.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColumnType {
    /// Boolean values (true/false)
    Boolean,
    /// 64-bit signed integers
    BigInt,
    /// Double-precision floating point numbers
    Double,
    /// Variable-length strings
    Varchar,
    /// Date and time with microsecond precision
    Timestamp,
    /// Date without time component
    Date,
}

impl ColumnType {
    /// Returns the SQL spelling of the column type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Date => "DATE",
        }
    }

    /// Type of a single value; `None` for blanks, which fit any column.
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Empty => None,
            Value::Bool(_) => Some(ColumnType::Boolean),
            Value::Int(_) => Some(ColumnType::BigInt),
            Value::Float(_) => Some(ColumnType::Double),
            Value::Date(_) => Some(ColumnType::Date),
            Value::DateTime(_) => Some(ColumnType::Timestamp),
            Value::Text(_) | Value::Error(_) => Some(ColumnType::Varchar),
        }
    }

    /// Detects the most specific common type of a column's values.
    /// Integers widen to doubles and dates to timestamps; any other mix,
    /// or a column with no values, falls back to VARCHAR.
    pub fn detect<'a, I>(values: I) -> ColumnType
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let types: Vec<ColumnType> = values.into_iter().filter_map(Self::of).collect();
        if types.is_empty() {
            ColumnType::Varchar
        } else if types.iter().all(|kind| *kind == ColumnType::Boolean) {
            ColumnType::Boolean
        } else if types.iter().all(|kind| *kind == ColumnType::BigInt) {
            ColumnType::BigInt
        } else if types.iter().all(|kind| kind.is_numeric()) {
            ColumnType::Double
        } else if types.iter().all(|kind| *kind == ColumnType::Date) {
            ColumnType::Date
        } else if types.iter().all(|kind| kind.is_temporal()) {
            ColumnType::Timestamp
        } else {
            ColumnType::Varchar
        }
    }

    #[inline]
    fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::BigInt | ColumnType::Double)
    }

    #[inline]
    fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Timestamp)
    }
}
