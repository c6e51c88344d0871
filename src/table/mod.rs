//! # Worksheet tables
//!
//! A [`Table`] is an ordered set of uniquely named columns over row-major
//! [`Value`] rows. It carries a single worksheet as read from the workbook and
//! the same worksheet after normalization. The combined dataset is a polars
//! frame built by [`crate::combine`].
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use std::collections::HashSet;
use std::fmt::Display;
use thiserror::Error;

/// Errors raised when a table would break its column invariants.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Duplicate column name '{0}'")]
    DuplicateColumnError(String),
}

/// A single cell value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Missing cell
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    /// Spreadsheet error literal such as `#DIV/0!`
    Error(String),
}

impl Value {
    /// Returns true for the missing value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Borrowed text, if the value is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Text(value) => write!(f, "{}", value),
            Value::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Value::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Time(value) => write!(f, "{}", value.format("%H:%M:%S%.f")),
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

/// Two-dimensional table with named columns.
///
/// Every row holds exactly one value per column; rows shorter than the
/// column list are padded with [`Value::Null`] when pushed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given column names.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumnError`] if a name repeats.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self, TableError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::<&str>::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumnError(name.to_owned()));
            }
        }
        Ok(Table {
            columns,
            rows: Vec::new(),
        })
    }

    /// Appends a row, padding missing trailing cells with nulls and dropping extras.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Cell at (row, column) position.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|record| record.get(col))
    }

    /// Cell at the given row in the named column.
    pub fn get_by_name(&self, row: usize, name: &str) -> Option<&Value> {
        self.column_index(name).and_then(|col| self.get(row, col))
    }

    /// Removes the first row, keeping the remaining rows contiguous from zero.
    pub fn remove_first_row(&mut self) -> Option<Vec<Value>> {
        if self.rows.is_empty() {
            None
        } else {
            Some(self.rows.remove(0))
        }
    }

    /// Sets every row of the named column to `value`, appending the column if absent.
    pub fn set_column(&mut self, name: &str, value: Value) {
        match self.column_index(name) {
            Some(col) => {
                for record in &mut self.rows {
                    record[col] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_owned());
                for record in &mut self.rows {
                    record.push(value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let mut table = Table::new(columns.iter().copied()).unwrap();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    #[test]
    fn new_rejects_duplicate_columns() {
        let result = Table::new(["A", "B", "A"]);
        assert!(matches!(result, Err(TableError::DuplicateColumnError(name)) if name == "A"));
    }

    #[test]
    fn push_row_pads_short_rows() {
        let table = table(&["A", "B", "C"], vec![vec![1i64.into()]]);
        assert_eq!(table.row(0).unwrap(), &[Value::Int(1), Value::Null, Value::Null]);
        assert_eq!(table.get(5, 0), None);
    }

    #[test]
    fn set_column_appends_then_overwrites() {
        let mut table = table(&["A"], vec![vec!["x".into()], vec!["y".into()]]);
        table.set_column("source_file", "a.xlsx".into());
        assert_eq!(table.columns(), &["A", "source_file"]);
        table.set_column("source_file", "b.xlsx".into());
        assert_eq!(table.column_count(), 2);
        assert!(table.rows().iter().all(|record| record[1].as_str() == Some("b.xlsx")));
    }

    #[test]
    fn set_column_on_empty_table_adds_column_only() {
        let mut table = Table::default();
        table.set_column("sheet_name", "Sheet1".into());
        assert_eq!(table.columns(), &["sheet_name"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn remove_first_row_keeps_order() {
        let mut table = table(&["A"], vec![vec![1i64.into()], vec![2i64.into()], vec![3i64.into()]]);
        assert_eq!(table.remove_first_row(), Some(vec![Value::Int(1)]));
        assert_eq!(table.get(0, 0), Some(&Value::Int(2)));
        assert_eq!(table.get(1, 0), Some(&Value::Int(3)));
        assert_eq!(Table::default().remove_first_row(), None);
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Float(10.0).to_string(), "10");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-02-29");
        assert_eq!(Value::DateTime(date.and_hms_opt(8, 30, 0).unwrap()).to_string(), "2024-02-29 08:30:00");
    }
}
