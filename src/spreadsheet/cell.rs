use crate::spreadsheet::reference::index_to_reference;
use crate::table::Value;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

const MILLISECONDS_PER_DAY: i64 = 86_400_000;

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Analyzes format codes for date/time patterns.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_color && !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }

    fn is_1904(&self) -> bool {
        matches!(self, Self::NumberDateTime1904 | Self::NumberDate1904 | Self::NumberTime1904)
    }
}

/// Represents a single cell in a worksheet with position, type, and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the worksheet
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the raw cell into a typed value, resolving shared strings.
    /// Empty text becomes null.
    pub(crate) fn to_value(&self, shared_strings: &[String]) -> Result<Value, String> {
        let value = match self.kind {
            CellType::Empty => Value::Null,
            CellType::Boolean => Value::Bool(self.value.trim() == "1"),
            CellType::Number => self.to_number()?,
            CellType::NumberDate1900 | CellType::NumberDate1904 => Value::Date(self.to_datetime()?.date()),
            CellType::NumberDateTime1900 | CellType::NumberDateTime1904 => Value::DateTime(self.to_datetime()?),
            CellType::NumberTime1900 | CellType::NumberTime1904 => Value::Time(self.to_time()?),
            CellType::IsoDateTime => self.to_iso_datetime()?,
            CellType::InlineString => Value::Text(self.value.to_owned()),
            CellType::SharedString => {
                let index = self
                    .value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("invalid shared string index '{}'", self.value))?;
                let text = shared_strings
                    .get(index)
                    .ok_or_else(|| format!("shared string index {} out of range", index))?;
                Value::Text(text.to_owned())
            }
            CellType::Error => Value::Error(self.value.to_owned()),
        };
        match value {
            Value::Text(text) if text.is_empty() => Ok(Value::Null),
            value => Ok(value),
        }
    }

    /// Converts cell value to double-precision floating point.
    fn to_double(&self) -> Result<f64, String> {
        self.value.trim().parse::<f64>().map_err(|_| format!("parse '{}' to double failed", self.value))
    }

    /// Integral text (no fraction or exponent) becomes an integer, anything else a float.
    fn to_number(&self) -> Result<Value, String> {
        let text = self.value.trim();
        if !text.contains(['.', 'e', 'E']) {
            if let Ok(integer) = text.parse::<i64>() {
                return Ok(Value::Int(integer));
            }
        }
        self.to_double().map(Value::Float)
    }

    /// Converts an Excel serial number to a date and time.
    /// Handles the Lotus 1-2-3 leap year bug of the 1900 epoch.
    fn to_datetime(&self) -> Result<NaiveDateTime, String> {
        let serial = self.to_double()?;
        let milliseconds = (serial * MILLISECONDS_PER_DAY as f64).round() as i64;
        let days = milliseconds.div_euclid(MILLISECONDS_PER_DAY);
        let time = to_time_of_day(milliseconds.rem_euclid(MILLISECONDS_PER_DAY));
        let offset = if self.kind.is_1904() {
            1_462
        } else if days < 60 {
            1
        } else {
            0
        };
        NaiveDate::from_ymd_opt(1899, 12, 30)
            .and_then(|epoch| epoch.checked_add_signed(Duration::days(days + offset)))
            .map(|date| date.and_time(time))
            .ok_or_else(|| format!("serial date '{}' out of range", self.value))
    }

    /// Converts the fractional day of an Excel serial number to a time of day.
    fn to_time(&self) -> Result<NaiveTime, String> {
        let fraction = self.to_double()?.fract();
        let milliseconds = (fraction * MILLISECONDS_PER_DAY as f64).round() as i64;
        Ok(to_time_of_day(milliseconds.rem_euclid(MILLISECONDS_PER_DAY)))
    }

    /// Parses ISO 8601 values written by `t="d"` cells.
    fn to_iso_datetime(&self) -> Result<Value, String> {
        let text = self.value.trim().trim_end_matches('Z');
        if text.contains('T') {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .map(Value::DateTime)
                .map_err(|_| format!("parse '{}' to NaiveDateTime failed", self.value))
        } else {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| format!("parse '{}' to NaiveDate failed", self.value))
        }
    }
}

fn to_time_of_day(milliseconds: i64) -> NaiveTime {
    let seconds = (milliseconds / 1_000) as u32;
    let nanoseconds = (milliseconds % 1_000) as u32 * 1_000_000;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanoseconds).unwrap_or(NaiveTime::MIN)
}
