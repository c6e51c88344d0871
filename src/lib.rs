//! # combine_sheets
//!
//! Combines a numbered series of Excel workbooks (`Traces-001.xlsx`,
//! `Traces-002.xlsx`, ...) into one in-memory table.
//!
//! ## Pipeline
//!
//! - **Enumerate** ([`enumerate`]): candidate file names for an index range,
//!   minus excluded indices
//! - **Load** ([`loader`]): every worksheet of every file that opens; files and
//!   worksheets that fail are logged, recorded and skipped
//! - **Normalize** ([`normalize`]): drop a leading units row (`deg` under `CA`)
//!   and add `source_file` and `sheet_name` columns
//! - **Combine** ([`combine::combine`]): diagonal concatenation into one polars
//!   frame over the union of columns
//!
//! [`pipeline::run`] drives all four steps and returns the combined frame with
//! a [`RunReport`]. [`summary`] describes the result.
//!
//! ## Features
//!
//! - `xlsx` (default): the built-in workbook reader. Without it
//!   [`spreadsheet::reader_capability`] reports the reader as unavailable and
//!   [`pipeline::run`] refuses to start.
#![cfg_attr(not(feature = "xlsx"), allow(dead_code))]

pub mod combine;
pub mod config;
pub mod enumerate;
pub mod error;
#[cfg(feature = "xlsx")]
mod helpers;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod spreadsheet;
pub mod summary;
pub mod table;

pub use crate::config::IngestConfig;
pub use crate::error::CombineSheetsError;
pub use crate::loader::Failure;
pub use crate::pipeline::run;
pub use crate::pipeline::Ingest;
pub use crate::pipeline::RunReport;
pub use crate::table::Table;
pub use crate::table::Value;
