//! End-to-end ingest: enumerate, load, normalize and combine.
use crate::combine::combine;
use crate::config::IngestConfig;
use crate::enumerate::candidates;
use crate::enumerate::excluded_in_range;
use crate::error::CombineSheetsError;
use crate::loader::Failure;
use crate::loader::SheetLoader;
use crate::normalize::normalize;
use crate::spreadsheet::reader_capability;
use crate::spreadsheet::Capability;
use crate::table::Table;
use polars::prelude::DataFrame;
use tracing::error;
use tracing::info;

/// What happened during a run, besides the combined table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub files_loaded: usize,
    pub sheets_loaded: usize,
    pub units_rows_removed: usize,
    pub failures: Vec<Failure>,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct Ingest {
    /// Every loaded row, tagged with `source_file` and `sheet_name`
    pub table: DataFrame,
    pub report: RunReport,
}

/// Runs the whole ingest for `config`.
///
/// Missing or unreadable files and worksheets are skipped and reported in
/// [`RunReport::failures`]. A build without a workbook reader fails before
/// any file is opened.
pub fn run(config: &IngestConfig) -> Result<Ingest, CombineSheetsError> {
    if let Capability::Unavailable { reason } = reader_capability() {
        error!(reason = %reason, "spreadsheet reader unavailable");
        return Err(CombineSheetsError::CapabilityUnavailable { reason });
    }

    info!(
        directory = %config.directory.display(),
        prefix = %config.prefix,
        start = config.start,
        end = config.end,
        "combining workbooks"
    );
    for index in excluded_in_range(config) {
        info!(file = %config.file_name(index), "skipping excluded file");
    }

    let mut loader = SheetLoader::new(candidates(config));
    let mut tables = Vec::<Table>::new();
    let mut units_rows_removed = 0usize;
    for sheet in loader.by_ref() {
        let normalized = normalize(&sheet.file_name, &sheet.sheet_name, sheet.table);
        if normalized.units_row_removed {
            info!(file = %sheet.file_name, sheet = %sheet.sheet_name, "removed units row");
            units_rows_removed += 1;
        }
        tables.push(normalized.table);
    }
    let (files_loaded, failures) = loader.into_parts();

    let report = RunReport {
        files_loaded,
        sheets_loaded: tables.len(),
        units_rows_removed,
        failures,
    };
    let table = combine(tables)?;
    info!(
        files = report.files_loaded,
        sheets = report.sheets_loaded,
        rows = table.height(),
        columns = table.width(),
        failures = report.failures.len(),
        "combined workbooks"
    );
    Ok(Ingest { table, report })
}
