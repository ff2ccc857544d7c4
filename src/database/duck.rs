use crate::database::column::ColumnType;
use crate::database::table::{Row, Table};
use crate::database::{StoreError, TableStore};
use crate::spreadsheet::cell::Value;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
use duckdb::params_from_iter;
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckdb::Connection;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// A [`TableStore`] backed by a DuckDB database.
///
/// DuckDB tables cannot exist without columns, so [`TableStore::create_table`]
/// only registers the name; the table itself is created by the following
/// [`TableStore::write_table`], together with its rows, in one transaction.
/// Other connections therefore never see a half-written output table.
/// DuckDB keeps no table order, so placement hints are ignored.
pub struct DuckDbStore {
    connection: Connection,
    created: HashSet<String>,
}

impl DuckDbStore {
    /// Opens (or creates) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// Wraps an existing connection.
    pub fn new(connection: Connection) -> Self {
        DuckDbStore {
            connection,
            created: HashSet::new(),
        }
    }

    /// The underlying connection, for ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Stores `table` under its own name, replacing any existing table.
    pub fn load_table(&mut self, table: &Table) -> Result<(), StoreError> {
        let header = table.header().cloned().unwrap_or_default();
        let rows: Vec<&Row> = table.data_rows().iter().collect();
        self.replace_table(&table.name, &header, &rows)
    }

    /// Column names and SQL types of a table, in column order.
    fn columns(&self, name: &str) -> Result<Vec<(String, String)>, StoreError> {
        let mut statement = self.connection.prepare(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE lower(table_name) = lower(?) ORDER BY ordinal_position",
        )?;
        let columns = statement
            .query_map([name], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

impl TableStore for DuckDbStore {
    fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        let columns = self.columns(name)?;
        if columns.is_empty() {
            return Err(StoreError::TableNotFound(name.to_owned()));
        }
        let width = columns.len();
        let selection = columns
            .iter()
            .map(|(column, kind)| {
                if is_cell_type(kind) {
                    quote(column)
                } else {
                    format!("CAST({} AS VARCHAR)", quote(column))
                }
            })
            .collect::<Vec<String>>()
            .join(", ");
        let mut statement = self
            .connection
            .prepare(&format!("SELECT {} FROM {}", selection, quote(name)))?;
        let data = statement
            .query_map([], |row| {
                (0..width)
                    .map(|index| row.get::<_, DuckValue>(index).map(from_duck))
                    .collect::<Result<Row, _>>()
            })?
            .collect::<Result<Vec<Row>, _>>()?;
        let names: Vec<&str> = columns.iter().map(|(column, _)| column.as_str()).collect();
        Ok(Table::with_header(name, &names, data))
    }

    fn contains_table(&self, name: &str) -> Result<bool, StoreError> {
        let count: i64 = self.connection.query_row(
            "SELECT count(*) FROM information_schema.tables WHERE lower(table_name) = lower(?)",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn drop_table(&mut self, name: &str) -> Result<(), StoreError> {
        self.connection
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", quote(name)))?;
        self.created.remove(name);
        Ok(())
    }

    fn create_table(&mut self, name: &str, _after: Option<&str>) -> Result<(), StoreError> {
        self.drop_table(name)?;
        self.created.insert(name.to_owned());
        Ok(())
    }

    fn write_table(&mut self, name: &str, header: &[Value], rows: &[&Row]) -> Result<(), StoreError> {
        if !self.created.contains(name) {
            return Err(StoreError::NotCreated(name.to_owned()));
        }
        let names = column_names(header);
        let kinds: Vec<ColumnType> = (0..names.len())
            .map(|column| ColumnType::detect(rows.iter().filter_map(|row| row.get(column))))
            .collect();
        let definitions = names
            .iter()
            .zip(kinds.iter())
            .map(|(name, kind)| format!("{} {}", quote(name), kind.as_str()))
            .collect::<Vec<String>>()
            .join(", ");

        let transaction = self.connection.transaction()?;
        transaction.execute_batch(&format!("CREATE TABLE {} ({})", quote(name), definitions))?;
        if !names.is_empty() {
            let placeholders = vec!["?"; names.len()].join(", ");
            let mut statement = transaction.prepare(&format!(
                "INSERT INTO {} VALUES ({})",
                quote(name),
                placeholders
            ))?;
            for row in rows {
                let values = kinds
                    .iter()
                    .enumerate()
                    .map(|(column, kind)| to_duck(row.get(column).unwrap_or(&Value::Empty), *kind));
                statement.execute(params_from_iter(values))?;
            }
        }
        transaction.commit()?;
        self.created.remove(name);
        debug!(table = name, rows = rows.len(), "wrote table");
        Ok(())
    }

    fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let mut statement = self
            .connection
            .prepare("SELECT table_name FROM information_schema.tables ORDER BY table_name")?;
        let names = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

/// Quotes an identifier for SQL.
fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Derives unique, non-empty SQL column names from a header row.
/// Titles are kept as written; blank ones become `column<N>` and repeated
/// ones get a `_<N>` suffix.
fn column_names(header: &[Value]) -> Vec<String> {
    let mut seen = HashSet::<String>::new();
    header
        .iter()
        .enumerate()
        .map(|(index, title)| {
            let base = if title.is_blank() {
                format!("column{}", index + 1)
            } else {
                title.to_string()
            };
            let mut name = base.to_owned();
            let mut suffix = 2;
            while !seen.insert(name.to_lowercase()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

/// SQL types read as native cell values; every other column is read as
/// DuckDB's own text rendering (intervals, enums, lists, structs, blobs...).
fn is_cell_type(data_type: &str) -> bool {
    matches!(
        data_type,
        "BOOLEAN"
            | "TINYINT"
            | "SMALLINT"
            | "INTEGER"
            | "BIGINT"
            | "HUGEINT"
            | "UTINYINT"
            | "USMALLINT"
            | "UINTEGER"
            | "UBIGINT"
            | "FLOAT"
            | "DOUBLE"
            | "VARCHAR"
            | "DATE"
            | "TIME"
            | "TIMESTAMP"
            | "TIMESTAMP_S"
            | "TIMESTAMP_MS"
            | "TIMESTAMP_NS"
    ) || data_type.starts_with("DECIMAL")
}

/// Converts an amount of `unit` into microseconds.
fn to_micros(unit: TimeUnit, amount: i64) -> i64 {
    match unit {
        TimeUnit::Second => amount.saturating_mul(1_000_000),
        TimeUnit::Millisecond => amount.saturating_mul(1_000),
        TimeUnit::Microsecond => amount,
        TimeUnit::Nanosecond => amount / 1_000,
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("NaiveDate Literal")
}

/// Converts a cell into a DuckDB value fitting a column of type `kind`.
fn to_duck(value: &Value, kind: ColumnType) -> DuckValue {
    match (kind, value) {
        (_, Value::Empty) => DuckValue::Null,
        (ColumnType::Boolean, Value::Bool(value)) => DuckValue::Boolean(*value),
        (ColumnType::BigInt, Value::Int(value)) => DuckValue::BigInt(*value),
        (ColumnType::Double, Value::Int(value)) => DuckValue::Double(*value as f64),
        (ColumnType::Double, Value::Float(value)) => DuckValue::Double(*value),
        (ColumnType::Date, Value::Date(date)) => {
            DuckValue::Date32((*date - epoch()).num_days() as i32)
        }
        (ColumnType::Timestamp, Value::Date(date)) => DuckValue::Timestamp(
            TimeUnit::Microsecond,
            date.and_time(NaiveTime::MIN).and_utc().timestamp_micros(),
        ),
        (ColumnType::Timestamp, Value::DateTime(datetime)) => {
            DuckValue::Timestamp(TimeUnit::Microsecond, datetime.and_utc().timestamp_micros())
        }
        (_, other) => DuckValue::Text(other.to_string()),
    }
}

/// Converts a DuckDB value read back from a table into a cell.
/// Integers too wide for `i64` keep their decimal text.
fn from_duck(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Empty,
        DuckValue::Boolean(value) => Value::Bool(value),
        DuckValue::TinyInt(value) => Value::Int(value as i64),
        DuckValue::SmallInt(value) => Value::Int(value as i64),
        DuckValue::Int(value) => Value::Int(value as i64),
        DuckValue::BigInt(value) => Value::Int(value),
        DuckValue::HugeInt(value) => i64::try_from(value)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(value.to_string())),
        DuckValue::UTinyInt(value) => Value::Int(value as i64),
        DuckValue::USmallInt(value) => Value::Int(value as i64),
        DuckValue::UInt(value) => Value::Int(value as i64),
        DuckValue::UBigInt(value) => i64::try_from(value)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(value.to_string())),
        DuckValue::Float(value) => Value::Float(value as f64),
        DuckValue::Double(value) => Value::Float(value),
        DuckValue::Text(value) | DuckValue::Enum(value) => Value::Text(value),
        DuckValue::Date32(days) => epoch()
            .checked_add_signed(Duration::days(days as i64))
            .map(Value::Date)
            .unwrap_or(Value::Empty),
        DuckValue::Time64(unit, amount) => {
            let micros = to_micros(unit, amount);
            u32::try_from(micros.div_euclid(1_000_000))
                .ok()
                .and_then(|seconds| {
                    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
                    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
                })
                .map(|time| Value::Text(time.to_string()))
                .unwrap_or(Value::Empty)
        }
        DuckValue::Timestamp(unit, amount) => DateTime::from_timestamp_micros(to_micros(unit, amount))
            .map(|datetime| Value::DateTime(datetime.naive_utc()))
            .unwrap_or(Value::Empty),
        DuckValue::Decimal(value) => value
            .to_string()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(value.to_string())),
        // read_table casts every other column type to VARCHAR
        _ => Value::Empty,
    }
}
