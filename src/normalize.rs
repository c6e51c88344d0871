//! Units-row removal and provenance tagging of a single worksheet table.
use crate::table::Table;
use crate::table::Value;

/// Column holding the crank angle; its first data cell may carry the unit.
pub const UNITS_COLUMN: &str = "CA";
/// Unit text marking a units row.
pub const UNITS_MARKER: &str = "deg";
pub const SOURCE_FILE_COLUMN: &str = "source_file";
pub const SHEET_NAME_COLUMN: &str = "sheet_name";

/// A worksheet table ready to be combined.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub table: Table,
    pub units_row_removed: bool,
}

fn is_units_marker(text: &str) -> bool {
    text.trim().to_lowercase() == UNITS_MARKER
}

/// True if the first row is a units row.
///
/// With a `CA` column only its first cell is checked; otherwise only the
/// first cell of the first column, and only when it holds text.
fn has_units_row(table: &Table) -> bool {
    if table.is_empty() {
        return false;
    }
    match table.column_index(UNITS_COLUMN) {
        Some(col) => table
            .get(0, col)
            .map(|value| !value.is_null() && is_units_marker(&value.to_string()))
            .unwrap_or(false),
        None => table
            .get(0, 0)
            .and_then(Value::as_str)
            .map(is_units_marker)
            .unwrap_or(false),
    }
}

/// Drops a leading units row if present, then stamps every row with
/// `source_file` and `sheet_name`.
pub fn normalize(file_name: &str, sheet_name: &str, mut table: Table) -> Normalized {
    let units_row_removed = has_units_row(&table) && table.remove_first_row().is_some();
    table.set_column(SOURCE_FILE_COLUMN, Value::from(file_name));
    table.set_column(SHEET_NAME_COLUMN, Value::from(sheet_name));
    Normalized {
        table,
        units_row_removed,
    }
}
