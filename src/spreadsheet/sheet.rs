use crate::error::CombineSheetsError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Table;
use crate::table::Value;
use std::collections::BTreeMap;
use std::collections::HashSet;

/// Raw cells of one worksheet collected in document order.
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in the sheet
    pub(crate) cells: Vec<Cell>,
    /// Rightmost column holding data
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            col_upper_bound: None,
        }
    }

    /// Adds a cell to the sheet, widening the column span.
    pub(super) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, col: usize) {
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Builds a table whose header is the first non-empty row.
    ///
    /// Columns start at column A and run to the rightmost cell holding data,
    /// so leading empty columns and cells to the right of the last header
    /// cell still get a (generated) column. Rows without any non-null value
    /// are dropped. An empty sheet gives an empty table.
    pub(crate) fn into_table(self, shared_strings: &[String]) -> Result<Table, CombineSheetsError> {
        let width = match self.col_upper_bound {
            Some(col_upper) => col_upper + 1,
            None => return Ok(Table::default()),
        };

        let mut records = BTreeMap::<usize, Vec<Value>>::new();
        for cell in &self.cells {
            let value = cell.to_value(shared_strings).map_err(|message| {
                SpreadsheetError::CellValueError(
                    self.file_name.to_owned(),
                    self.name.to_owned(),
                    cell.reference(),
                    message,
                )
            })?;
            if value.is_null() {
                continue;
            }
            let record = records.entry(cell.row).or_insert_with(|| vec![Value::Null; width]);
            record[cell.col] = value;
        }

        let mut records = records.into_values();
        let header = match records.next() {
            Some(header) => header,
            None => return Ok(Table::default()),
        };
        let mut table = Table::new(header_names(&header))?;
        for record in records {
            table.push_row(record);
        }
        Ok(table)
    }
}

/// Turns header cells into unique column names.
/// Header text is kept as written. Empty cells become `Unnamed: {position}`
/// and repeats get `.1`, `.2`, ... suffixes.
pub(crate) fn header_names(header: &[Value]) -> Vec<String> {
    let mut seen = HashSet::<String>::new();
    let mut names = Vec::<String>::with_capacity(header.len());
    for (position, value) in header.iter().enumerate() {
        let text = value.to_string();
        let base = if text.is_empty() {
            format!("Unnamed: {}", position)
        } else {
            text
        };
        let mut name = base.to_owned();
        let mut suffix = 0usize;
        while seen.contains(&name) {
            suffix += 1;
            name = format!("{}.{}", base, suffix);
        }
        seen.insert(name.to_owned());
        names.push(name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellType;

    fn push(sheet: &mut Sheet, row: usize, col: usize, kind: CellType, value: &str) {
        sheet.push(Cell {
            row,
            col,
            kind,
            value: value.to_owned(),
        });
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("", "");

        assert!(sheet.cells.is_empty());
        assert_eq!(sheet.col_upper_bound, None);
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("", "");
        push(&mut sheet, 1, 1, CellType::InlineString, "x");
        push(&mut sheet, 1, 3, CellType::InlineString, "x");
        push(&mut sheet, 3, 1, CellType::InlineString, "x");
        push(&mut sheet, 3, 3, CellType::InlineString, "x");

        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.col_upper_bound, Some(3));
    }

    #[test]
    fn empty_sheet_gives_empty_table() {
        let table = Sheet::new("a.xlsx", "Sheet1").into_table(&[]).unwrap();
        assert_eq!(table, Table::default());
    }

    #[test]
    fn first_non_empty_row_is_header() {
        let mut sheet = Sheet::new("a.xlsx", "Sheet1");
        push(&mut sheet, 2, 1, CellType::InlineString, "CA");
        push(&mut sheet, 2, 2, CellType::SharedString, "0");
        push(&mut sheet, 3, 1, CellType::SharedString, "1");
        push(&mut sheet, 5, 1, CellType::Number, "12.5");
        push(&mut sheet, 5, 2, CellType::Number, "3");
        push(&mut sheet, 6, 3, CellType::Number, "7");
        let shared = vec!["Force".to_owned(), "deg".to_owned()];
        let table = sheet.into_table(&shared).unwrap();

        assert_eq!(table.columns(), &["Unnamed: 0", "CA", "Force", "Unnamed: 3"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.get(0, 0), Some(&Value::Null));
        assert_eq!(table.get(0, 1), Some(&Value::Text("deg".to_owned())));
        assert_eq!(table.get(1, 1), Some(&Value::Float(12.5)));
        assert_eq!(table.get(1, 2), Some(&Value::Int(3)));
        assert_eq!(table.get(2, 3), Some(&Value::Int(7)));
        assert_eq!(table.get(2, 1), Some(&Value::Null));
    }

    #[test]
    fn rows_of_empty_text_are_skipped() {
        let mut sheet = Sheet::new("a.xlsx", "Sheet1");
        push(&mut sheet, 0, 0, CellType::InlineString, "A");
        push(&mut sheet, 1, 0, CellType::SharedString, "0");
        push(&mut sheet, 2, 0, CellType::Number, "1");
        let table = sheet.into_table(&["".to_owned()]).unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get(0, 0), Some(&Value::Int(1)));
    }

    #[test]
    fn bad_cell_value_names_its_reference() {
        let mut sheet = Sheet::new("a.xlsx", "Sheet1");
        push(&mut sheet, 0, 0, CellType::InlineString, "A");
        push(&mut sheet, 1, 0, CellType::Number, "oops");
        let error = sheet.into_table(&[]).unwrap_err();

        assert!(error.to_string().contains("A2"), "{}", error);
    }

    #[test]
    fn header_names_are_unique() {
        let header = vec![
            Value::from("CA"),
            Value::Null,
            Value::from("CA"),
            Value::from(" CA "),
            Value::from(10i64),
        ];
        assert_eq!(header_names(&header), vec!["CA", "Unnamed: 1", "CA.1", " CA ", "10"]);
    }

    #[test]
    fn padded_header_text_is_kept() {
        let mut sheet = Sheet::new("a.xlsx", "Sheet1");
        push(&mut sheet, 0, 0, CellType::InlineString, " CA ");
        push(&mut sheet, 0, 1, CellType::InlineString, "P ");
        push(&mut sheet, 1, 0, CellType::InlineString, "deg");
        let table = sheet.into_table(&[]).unwrap();

        assert_eq!(table.columns(), &[" CA ", "P "]);
        assert_eq!(table.column_index("CA"), None);
    }
}
