//! Lazy worksheet loading over a sequence of candidate files.
//!
//! Files that cannot be opened and worksheets that cannot be read are logged,
//! recorded as [`Failure`]s and skipped; the iterator itself never fails.
use crate::enumerate::Candidate;
use crate::spreadsheet::open_spreadsheet;
use crate::spreadsheet::Spreadsheet;
use crate::table::Table;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// A recoverable problem met while loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("could not open '{file_name}': {message}")]
    File { file_name: String, message: String },

    #[error("could not read sheet '{sheet_name}' of '{file_name}': {message}")]
    Sheet {
        file_name: String,
        sheet_name: String,
        message: String,
    },
}

impl Failure {
    pub fn file_name(&self) -> &str {
        match self {
            Failure::File { file_name, .. } | Failure::Sheet { file_name, .. } => file_name,
        }
    }
}

/// One worksheet read from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSheet {
    pub file_name: String,
    pub sheet_name: String,
    pub table: Table,
}

struct OpenWorkbook {
    file_name: String,
    spreadsheet: Box<dyn Spreadsheet>,
    pending: VecDeque<String>,
}

/// Iterator yielding every readable worksheet of every openable candidate,
/// files in candidate order and worksheets in declaration order.
///
/// At most one workbook is open at a time. It is dropped once its last
/// worksheet has been yielded.
pub struct SheetLoader<I> {
    candidates: I,
    current: Option<OpenWorkbook>,
    files_loaded: usize,
    failures: Vec<Failure>,
}

impl<I: Iterator<Item = Candidate>> SheetLoader<I> {
    pub fn new(candidates: impl IntoIterator<IntoIter = I>) -> Self {
        SheetLoader {
            candidates: candidates.into_iter(),
            current: None,
            files_loaded: 0,
            failures: Vec::new(),
        }
    }

    /// Failures recorded so far.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Number of files opened successfully so far.
    pub fn files_loaded(&self) -> usize {
        self.files_loaded
    }

    /// Consumes the loader, returning the opened file count and the failures.
    pub fn into_parts(self) -> (usize, Vec<Failure>) {
        (self.files_loaded, self.failures)
    }

    /// Opens the next candidate that can be opened, recording those that can't.
    fn open_next(&mut self) -> Option<OpenWorkbook> {
        for candidate in self.candidates.by_ref() {
            match open_spreadsheet(&candidate.full_path) {
                Ok(spreadsheet) => {
                    let pending: VecDeque<String> = spreadsheet.sheet_names().into();
                    info!(file = %candidate.file_name, sheets = pending.len(), "loaded workbook");
                    debug!(path = %spreadsheet.name(), "opened workbook");
                    self.files_loaded += 1;
                    return Some(OpenWorkbook {
                        file_name: candidate.file_name,
                        spreadsheet,
                        pending,
                    });
                }
                Err(error) => {
                    warn!(file = %candidate.file_name, error = %error, "skipping file");
                    self.failures.push(Failure::File {
                        file_name: candidate.file_name,
                        message: error.to_string(),
                    });
                }
            }
        }
        None
    }
}

impl<I: Iterator<Item = Candidate>> Iterator for SheetLoader<I> {
    type Item = LoadedSheet;

    fn next(&mut self) -> Option<LoadedSheet> {
        loop {
            if self.current.is_none() {
                self.current = Some(self.open_next()?);
            }
            let workbook = self.current.as_mut()?;
            let sheet_name = match workbook.pending.pop_front() {
                Some(sheet_name) => sheet_name,
                None => {
                    self.current = None;
                    continue;
                }
            };
            let file_name = workbook.file_name.to_owned();
            let result = workbook.spreadsheet.read_sheet(&sheet_name);
            if workbook.pending.is_empty() {
                self.current = None;
            }
            match result {
                Ok(table) => {
                    debug!(file = %file_name, sheet = %sheet_name, rows = table.row_count(), "loaded sheet");
                    return Some(LoadedSheet {
                        file_name,
                        sheet_name,
                        table,
                    });
                }
                Err(error) => {
                    warn!(file = %file_name, sheet = %sheet_name, error = %error, "skipping sheet");
                    self.failures.push(Failure::Sheet {
                        file_name,
                        sheet_name,
                        message: error.to_string(),
                    });
                }
            }
        }
    }
}
