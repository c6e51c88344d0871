use std::collections::BTreeSet;
use std::path::PathBuf;

pub const DEFAULT_PREFIX: &str = "Traces-";
pub const DEFAULT_START: u32 = 1;
pub const DEFAULT_END: u32 = 20;
/// Index 15 of the trace series is known bad.
pub const DEFAULT_EXCLUDED: [u32; 1] = [15];
/// Extension of every candidate file.
pub const EXTENSION: &str = ".xlsx";

/// Where to look for the numbered workbooks and which indices to take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub directory: PathBuf,
    pub prefix: String,
    /// First index, inclusive
    pub start: u32,
    /// Last index, inclusive
    pub end: u32,
    pub excluded: BTreeSet<u32>,
}

impl IngestConfig {
    /// Configuration with the default prefix, range and exclusions for `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        IngestConfig {
            directory: directory.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            start: DEFAULT_START,
            end: DEFAULT_END,
            excluded: BTreeSet::from(DEFAULT_EXCLUDED),
        }
    }

    /// File name for an index, zero-padded to three digits: `Traces-007.xlsx`.
    /// Wider indices keep all their digits.
    pub fn file_name(&self, index: u32) -> String {
        format!("{}{:03}{}", self.prefix, index, EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = IngestConfig::new("/data");
        assert_eq!(config.directory, PathBuf::from("/data"));
        assert_eq!(config.prefix, "Traces-");
        assert_eq!((config.start, config.end), (1, 20));
        assert_eq!(config.excluded.iter().copied().collect::<Vec<_>>(), vec![15]);
    }

    #[test]
    fn file_names_are_zero_padded() {
        let config = IngestConfig::new(".");
        assert_eq!(config.file_name(1), "Traces-001.xlsx");
        assert_eq!(config.file_name(20), "Traces-020.xlsx");
        assert_eq!(config.file_name(1234), "Traces-1234.xlsx");
    }
}
