use chrono::NaiveDate;
use chrono::NaiveDateTime;
use std::fmt::Display;

/// Text layouts accepted when a due date arrives as a string.
/// Tried in order; the first successful parse wins.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
];

/// Datetime layouts accepted for text cells, reduced to their date part.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A single cell value of a table.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Bool(bool),
    /// Integral numbers
    Int(i64),
    /// Floating point numbers
    Float(f64),
    /// Plain text
    Text(String),
    /// Date without time component
    Date(NaiveDate),
    /// Date and time
    DateTime(NaiveDateTime),
    /// Spreadsheet error literal such as `#N/A`
    Error(String),
}

impl Value {
    /// Returns true for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Interprets the cell as a calendar date.
    ///
    /// Dates and datetimes convert directly (the time part is dropped), text
    /// is parsed with the layouts in [`DATE_FORMATS`] and [`DATETIME_FORMATS`].
    /// Numbers are not treated as dates: a spreadsheet serial number only
    /// means a date when the cell carries a date format, and the workbook
    /// loader already turns those into [`Value::Date`] / [`Value::DateTime`].
    pub fn to_date(&self) -> Result<NaiveDate, String> {
        match self {
            Value::Date(date) => Ok(*date),
            Value::DateTime(datetime) => Ok(datetime.date()),
            Value::Text(text) => parse_date(text.trim())
                .ok_or_else(|| format!("parse '{}' to date failed", text)),
            other => Err(format!("parse '{}' to date failed", other)),
        }
    }

    /// Interprets the cell as a floating point number.
    pub fn to_double(&self) -> Result<f64, String> {
        match self {
            Value::Int(value) => Ok(*value as f64),
            Value::Float(value) => Ok(*value),
            Value::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("parse '{}' to double failed", text)),
            other => Err(format!("parse '{}' to double failed", other)),
        }
    }

    /// Interprets the cell as a 64-bit integer. Floats must have no fractional part.
    pub fn to_bigint(&self) -> Result<i64, String> {
        match self {
            Value::Int(value) => Ok(*value),
            Value::Float(value) if value.fract() == 0.0 => Ok(*value as i64),
            Value::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("parse '{}' to bigint failed", text)),
            other => Err(format!("parse '{}' to bigint failed", other)),
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Text(value) => write!(f, "{}", value),
            Value::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Value::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            Value::Error(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}
