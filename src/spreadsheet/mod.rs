//! # Spreadsheet Module
//!
//! Cell values, row criteria and the workbook loader. The loader reads one
//! worksheet of an Excel (.xlsx, .xlsm, .xlam, .xlsb, .xls, .xla) or
//! OpenDocument (.ods) file into a [`Table`], keeping the cell types the
//! workbook declares so that date-formatted cells arrive as dates.
use crate::database::table::{Row, Table};
use crate::spreadsheet::cell::Value;
use calamine::{open_workbook, Data, Ods, OdsError, Reader, Xls, XlsError, Xlsb, XlsbError, Xlsx, XlsxError};
use chrono::{NaiveDate, NaiveDateTime};
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod cell;
pub mod criteria;
pub mod reference;

#[cfg(test)]
pub(crate) mod fixture;

/// Errors raised while opening a workbook or reading one of its sheets.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Error in Excel 2007+ format (.xlsx, .xlsm, .xlam)
    #[error("Invalid xlsx file format: {0}")]
    InvalidXlsxFileFormat(#[from] XlsxError),

    /// Error in Excel Binary format (.xlsb)
    #[error("Invalid xlsb file format: {0}")]
    InvalidXlsbFileFormat(#[from] XlsbError),

    /// Error in legacy Excel format (.xls, .xla)
    #[error("Invalid xls file format: {0}")]
    InvalidXlsFileFormat(#[from] XlsError),

    /// Error in OpenDocument format (.ods)
    #[error("Invalid ods file format: {0}")]
    InvalidOdsFileFormat(#[from] OdsError),

    /// Unsupported or unrecognized file format
    #[error("Cannot detect file format for '{name}'")]
    InvalidFileFormat { name: String },

    /// Requested sheet not found or spreadsheet is empty
    #[error("Sheet '{name}' not found, available sheets: [{available}]")]
    SheetNotFound { name: String, available: String },
}

type FileReader = BufReader<File>;

/// An opened workbook, one variant per supported format.
pub enum Spreadsheet {
    /// Excel 2007+ format reader (.xlsx, .xlsm, .xlam)
    Xlsx(Xlsx<FileReader>),
    /// Excel Binary format reader (.xlsb)
    Xlsb(Xlsb<FileReader>),
    /// Legacy Excel format reader (.xls, .xla)
    Xls(Xls<FileReader>),
    /// OpenDocument format reader (.ods)
    Ods(Ods<FileReader>),
}

impl Spreadsheet {
    /// Opens a spreadsheet file, choosing the reader from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not a supported format or the file
    /// cannot be opened or parsed.
    pub fn open<P>(path: P) -> Result<Spreadsheet, SpreadsheetError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") | Some("xlam") => Ok(Self::Xlsx(open_workbook(path)?)),
            Some("xlsb") => Ok(Self::Xlsb(open_workbook(path)?)),
            Some("xls") | Some("xla") => Ok(Self::Xls(open_workbook(path)?)),
            Some("ods") => Ok(Self::Ods(open_workbook(path)?)),
            _ => Err(SpreadsheetError::InvalidFileFormat {
                name: path.to_string_lossy().to_string(),
            }),
        }
    }

    /// Returns the names of all sheets in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Xlsx(xlsx) => xlsx.sheet_names(),
            Self::Xlsb(xlsb) => xlsb.sheet_names(),
            Self::Xls(xls) => xls.sheet_names(),
            Self::Ods(ods) => ods.sheet_names(),
        }
    }

    /// Reads a sheet into a [`Table`] named `table_name`.
    ///
    /// The sheet's used range becomes the table: its first row is the header.
    /// When `sheet_name` is `None` the first sheet is read. Rows whose cells
    /// are all blank are dropped when `skip_empty_rows` is set.
    pub fn read_table(
        &mut self,
        sheet_name: Option<&str>,
        table_name: &str,
        skip_empty_rows: bool,
    ) -> Result<Table, SpreadsheetError> {
        let names = self.sheet_names();
        let sheet_name = match sheet_name {
            Some(name) => names
                .iter()
                .find(|candidate| candidate.as_str() == name)
                .cloned(),
            None => names.first().cloned(),
        }
        .ok_or_else(|| SpreadsheetError::SheetNotFound {
            name: sheet_name.unwrap_or_default().to_owned(),
            available: names.join(", "),
        })?;

        let range = match self {
            Self::Xlsx(xlsx) => xlsx.worksheet_range(&sheet_name)?,
            Self::Xlsb(xlsb) => xlsb.worksheet_range(&sheet_name)?,
            Self::Xls(xls) => xls.worksheet_range(&sheet_name)?,
            Self::Ods(ods) => ods.worksheet_range(&sheet_name)?,
        };

        let rows: Vec<Row> = range
            .rows()
            .map(|row| row.iter().map(to_value).collect::<Row>())
            .enumerate()
            .filter(|(index, row)| *index == 0 || !skip_empty_rows || !row.iter().all(Value::is_blank))
            .map(|(_, row)| row)
            .collect();
        debug!(sheet = %sheet_name, rows = rows.len(), "read worksheet");
        Ok(Table::new(table_name, rows))
    }
}

/// Converts a calamine cell into a [`Value`].
///
/// Date-formatted numbers with no fractional day become [`Value::Date`],
/// other date-formatted numbers become [`Value::DateTime`].
pub(crate) fn to_value(data: &Data) -> Value {
    match data {
        Data::Empty => Value::Empty,
        Data::Bool(value) => Value::Bool(*value),
        Data::Int(value) => Value::Int(*value),
        Data::Float(value) => Value::Float(*value),
        Data::String(value) => Value::Text(value.to_owned()),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) if value.as_f64().fract() == 0.0 => Value::Date(datetime.date()),
            Some(datetime) => Value::DateTime(datetime),
            None => Value::Float(value.as_f64()),
        },
        Data::DateTimeIso(value) => parse_iso(value),
        Data::DurationIso(value) => Value::Text(value.to_owned()),
        Data::Error(error) => Value::Error(error.to_string()),
    }
}

fn parse_iso(value: &str) -> Value {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        if datetime.time() == chrono::NaiveTime::MIN {
            Value::Date(datetime.date())
        } else {
            Value::DateTime(datetime)
        }
    } else if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Value::Date(date)
    } else {
        Value::Text(value.to_owned())
    }
}
