//! Candidate file names for a numbered series. Pure; never touches the filesystem.
use crate::config::IngestConfig;
use std::path::PathBuf;

/// One file the loader should try to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub index: u32,
    pub file_name: String,
    pub full_path: PathBuf,
}

/// Every index in `[start, end]` that is not excluded, ascending.
/// `start > end` yields nothing.
pub fn candidates(config: &IngestConfig) -> impl Iterator<Item = Candidate> + '_ {
    (config.start..=config.end)
        .filter(|index| !config.excluded.contains(index))
        .map(|index| {
            let file_name = config.file_name(index);
            Candidate {
                index,
                full_path: config.directory.join(&file_name),
                file_name,
            }
        })
}

/// Excluded indices that fall inside the configured range.
pub fn excluded_in_range(config: &IngestConfig) -> Vec<u32> {
    config
        .excluded
        .range(config.start..=config.end.max(config.start))
        .copied()
        .filter(|index| *index <= config.end)
        .collect()
}
