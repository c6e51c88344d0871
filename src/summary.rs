//! Inspection helpers over the combined frame: per-column information,
//! a row preview and descriptive statistics of numeric columns.
use polars::prelude::*;
use std::fmt::Display;

/// Information about one column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: DataType,
}

/// Shape and per-column information of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TableInfo {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
}

/// Collects the non-null count and type of every column.
pub fn info(frame: &DataFrame) -> TableInfo {
    let columns = frame
        .get_columns()
        .iter()
        .map(|column| ColumnInfo {
            name: column.name().to_string(),
            non_null: column.len() - column.null_count(),
            dtype: column.dtype().clone(),
        })
        .collect();
    TableInfo {
        rows: frame.height(),
        columns,
    }
}

impl Display for TableInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} rows, {} columns", self.rows, self.columns.len())?;
        let width = self.columns.iter().map(|column| column.name.len()).max().unwrap_or(0);
        for (index, column) in self.columns.iter().enumerate() {
            writeln!(
                f,
                "{:>3}  {:<width$}  {} non-null  {}",
                index, column.name, column.non_null, column.dtype,
            )?;
        }
        Ok(())
    }
}

/// First `rows` rows of the frame.
pub fn preview(frame: &DataFrame, rows: usize) -> DataFrame {
    frame.head(Some(rows))
}

/// Descriptive statistics of a numeric column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, absent for fewer than two values
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Display for ColumnStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let std = self.std.map(|std| format!("{std:.4}")).unwrap_or_else(|| "-".to_owned());
        write!(
            f,
            "{}: count={} mean={:.4} std={} min={} 25%={} 50%={} 75%={} max={}",
            self.name, self.count, self.mean, std, self.min, self.q25, self.median, self.q75, self.max,
        )
    }
}

fn scalar(stats: &DataFrame, name: &str) -> PolarsResult<Option<f64>> {
    Ok(stats.column(name)?.as_materialized_series().f64()?.get(0))
}

/// Computes statistics for every integer or float column with at least one value.
///
/// Quantiles use linear interpolation and `std` is the sample standard deviation.
pub fn describe(frame: &DataFrame) -> PolarsResult<Vec<ColumnStats>> {
    let mut described = Vec::<ColumnStats>::new();
    for column in frame.get_columns() {
        if !matches!(column.dtype(), DataType::Int64 | DataType::Float64) {
            continue;
        }
        let count = column.len() - column.null_count();
        if count == 0 {
            continue;
        }

        let name = column.name().clone();
        let values = || col(name.clone()).cast(DataType::Float64);
        let stats = frame
            .select([name.clone()])?
            .lazy()
            .select([
                values().mean().alias("mean"),
                values().std(1).alias("std"),
                values().min().alias("min"),
                values().quantile(lit(0.25), QuantileMethod::Linear).alias("q25"),
                values().quantile(lit(0.5), QuantileMethod::Linear).alias("median"),
                values().quantile(lit(0.75), QuantileMethod::Linear).alias("q75"),
                values().max().alias("max"),
            ])
            .collect()?;

        let required = |field: &str| -> PolarsResult<f64> { Ok(scalar(&stats, field)?.unwrap_or(f64::NAN)) };
        described.push(ColumnStats {
            name: name.to_string(),
            count,
            mean: required("mean")?,
            std: scalar(&stats, "std")?.filter(|std| count > 1 && std.is_finite()),
            min: required("min")?,
            q25: required("q25")?,
            median: required("median")?,
            q75: required("q75")?,
            max: required("max")?,
        });
    }
    Ok(described)
}
