use crate::spreadsheet::cell::Value;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Comparison operators a [`Criterion`] can apply between a cell and its threshold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl Comparison {
    /// Evaluates `left <op> right`. Incomparable values (e.g. NaN) never match.
    pub fn test<T: PartialOrd>(&self, left: &T, right: &T) -> bool {
        match left.partial_cmp(right) {
            Some(ordering) => match self {
                Comparison::Lt => ordering == Ordering::Less,
                Comparison::Le => ordering != Ordering::Greater,
                Comparison::Eq => ordering == Ordering::Equal,
                Comparison::Ne => ordering != Ordering::Equal,
                Comparison::Ge => ordering != Ordering::Less,
                Comparison::Gt => ordering == Ordering::Greater,
            },
            None => false,
        }
    }
}

/// Conversion from a cell into a comparable threshold type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, String> {
        value.to_date()
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        value.to_double()
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        value.to_bigint()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Empty | Value::Error(_) => Err(format!("'{}' is not text", value)),
            other => Ok(other.to_string()),
        }
    }
}

/// Criterion for selecting rows: `cell[column] <comparison> threshold`.
#[derive(Clone, Debug)]
pub struct Criterion<T> {
    /// 0-based column index the criterion reads
    pub column: usize,
    /// Operator applied as `cell <op> threshold`
    pub comparison: Comparison,
    /// Right-hand side of the comparison
    pub threshold: T,
}

impl<T: FromValue + PartialOrd> Criterion<T> {
    pub fn new(column: usize, comparison: Comparison, threshold: T) -> Self {
        Criterion {
            column,
            comparison,
            threshold,
        }
    }

    /// Shorthand for the `cell <= threshold` criterion.
    pub fn at_most(column: usize, threshold: T) -> Self {
        Self::new(column, Comparison::Le, threshold)
    }

    /// Evaluates the criterion against one cell.
    ///
    /// Returns `Err` when the cell cannot be read as `T`; callers decide
    /// whether that excludes the row or aborts.
    pub fn evaluate(&self, value: &Value) -> Result<bool, String> {
        let value = T::from_value(value)?;
        Ok(self.comparison.test(&value, &self.threshold))
    }
}
