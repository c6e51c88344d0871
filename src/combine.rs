//! # Combining worksheet tables
//!
//! Each normalized worksheet [`Table`] becomes a polars [`DataFrame`] with one
//! typed column per table column. The frames are then concatenated
//! diagonally: the result holds the union of all columns in first-seen order
//! and a frame lacking a column contributes nulls there.
//!
//! A column whose values mix kinds inside one worksheet is stored as text.
//! Across worksheets, integer and float columns of the same name widen to
//! float and any other disagreement falls back to text.
use crate::error::CombineSheetsError;
use crate::table::Table;
use crate::table::Value;
use chrono::Datelike;
use chrono::Timelike;
use polars::lazy::dsl::concat;
use polars::prelude::*;
use std::collections::HashMap;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
/// Days from 0001-01-01 to 1970-01-01
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Common kind of the non-null values of one column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Kind {
    Empty,
    Bool,
    Int,
    Float,
    Text,
    Date,
    DateTime,
    Time,
    Mixed,
}

impl Kind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => Kind::Empty,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Text(_) | Value::Error(_) => Kind::Text,
            Value::Date(_) => Kind::Date,
            Value::DateTime(_) => Kind::DateTime,
            Value::Time(_) => Kind::Time,
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Kind::Empty, kind) | (kind, Kind::Empty) => kind,
            (left, right) if left == right => left,
            (Kind::Int, Kind::Float) | (Kind::Float, Kind::Int) => Kind::Float,
            _ => Kind::Mixed,
        }
    }
}

/// Builds one typed series from the values of a column.
fn to_series(name: &str, values: &[&Value]) -> PolarsResult<Series> {
    let name = PlSmallStr::from(name);
    let kind = values.iter().fold(Kind::Empty, |kind, value| kind.merge(Kind::of(value)));
    let series = match kind {
        Kind::Empty => Series::full_null(name, values.len(), &DataType::Null),
        Kind::Bool => {
            let bools: Vec<Option<bool>> = values
                .iter()
                .map(|value| match value {
                    Value::Bool(value) => Some(*value),
                    _ => None,
                })
                .collect();
            Series::new(name, bools)
        }
        Kind::Int => {
            let ints: Vec<Option<i64>> = values
                .iter()
                .map(|value| match value {
                    Value::Int(value) => Some(*value),
                    _ => None,
                })
                .collect();
            Series::new(name, ints)
        }
        Kind::Float => {
            let floats: Vec<Option<f64>> = values.iter().map(|value| value.as_f64()).collect();
            Series::new(name, floats)
        }
        Kind::Date => {
            let days: Vec<Option<i32>> = values
                .iter()
                .map(|value| match value {
                    Value::Date(date) => Some(date.num_days_from_ce() - EPOCH_DAYS_FROM_CE),
                    _ => None,
                })
                .collect();
            Series::new(name, days).cast(&DataType::Date)?
        }
        Kind::DateTime => {
            let millis: Vec<Option<i64>> = values
                .iter()
                .map(|value| match value {
                    Value::DateTime(datetime) => Some(datetime.and_utc().timestamp_millis()),
                    _ => None,
                })
                .collect();
            Series::new(name, millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        Kind::Time => {
            let nanos: Vec<Option<i64>> = values
                .iter()
                .map(|value| match value {
                    Value::Time(time) => Some(
                        i64::from(time.num_seconds_from_midnight()) * NANOS_PER_SECOND + i64::from(time.nanosecond()),
                    ),
                    _ => None,
                })
                .collect();
            Series::new(name, nanos).cast(&DataType::Time)?
        }
        Kind::Text | Kind::Mixed => {
            let texts: Vec<Option<String>> = values
                .iter()
                .map(|value| (!value.is_null()).then(|| value.to_string()))
                .collect();
            Series::new(name, texts)
        }
    };
    Ok(series)
}

/// Converts a worksheet table into a data frame with the same columns and rows.
pub fn to_frame(table: &Table) -> PolarsResult<DataFrame> {
    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let values: Vec<&Value> = table.rows().iter().map(|record| &record[col]).collect();
            Ok(to_series(name, &values)?.into_column())
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    DataFrame::new(columns)
}

/// Picks one type per column name so every frame agrees before concatenation.
fn common_types(frames: &[DataFrame]) -> HashMap<String, DataType> {
    let mut types = HashMap::<String, DataType>::new();
    for frame in frames {
        for column in frame.get_columns() {
            let dtype = column.dtype();
            if dtype == &DataType::Null {
                continue;
            }
            let common = match types.get(column.name().as_str()) {
                None => dtype.clone(),
                Some(current) if current == dtype => dtype.clone(),
                Some(DataType::Int64) if dtype == &DataType::Float64 => DataType::Float64,
                Some(DataType::Float64) if dtype == &DataType::Int64 => DataType::Float64,
                Some(_) => DataType::String,
            };
            types.insert(column.name().to_string(), common);
        }
    }
    types
}

/// Concatenates worksheet tables row-wise over the union of their columns.
///
/// Rows keep the order of `tables`. No tables give an empty frame with no
/// columns.
pub fn combine(tables: Vec<Table>) -> Result<DataFrame, CombineSheetsError> {
    if tables.is_empty() {
        return Ok(DataFrame::empty());
    }
    let frames = tables.iter().map(to_frame).collect::<PolarsResult<Vec<DataFrame>>>()?;
    let types = common_types(&frames);

    let lazy_frames: Vec<LazyFrame> = frames
        .into_iter()
        .map(|frame| {
            let casts: Vec<Expr> = frame
                .get_columns()
                .iter()
                .filter_map(|column| {
                    let target = types.get(column.name().as_str())?;
                    (column.dtype() != target).then(|| col(column.name().clone()).cast(target.clone()))
                })
                .collect();
            if casts.is_empty() {
                frame.lazy()
            } else {
                frame.lazy().with_columns(casts)
            }
        })
        .collect();

    let combined = concat(
        lazy_frames,
        UnionArgs {
            parallel: false,
            rechunk: true,
            to_supertypes: true,
            diagonal: true,
            maintain_order: true,
            ..Default::default()
        },
    )?
    .collect()?;
    Ok(combined)
}
