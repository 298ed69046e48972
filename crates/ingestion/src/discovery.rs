//! Candidate file discovery.
//!
//! Walks the input tree and keeps `.csv` files whose name ends in a
//! `DDMMYYYY` date, newest first.

use chrono::NaiveDate;
use consolidator_core::{Error, Result, SourceFile};
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extension of candidate files (case-sensitive).
pub const CANDIDATE_EXTENSION: &str = ".csv";

/// Day, month and year directly before the extension.
const DATE_SUFFIX_PATTERN: &str = r"([0-9]{2})([0-9]{2})([0-9]{4})\.csv$";

/// Finds dated input files below a root directory.
pub struct FileDiscovery {
    date_suffix: Regex,
}

impl FileDiscovery {
    /// Create a new discovery walker.
    pub fn new() -> Result<Self> {
        Self::with_pattern(DATE_SUFFIX_PATTERN)
    }

    fn with_pattern(pattern: &str) -> Result<Self> {
        let date_suffix = Regex::new(pattern)
            .map_err(|err| Error::discovery(format!("invalid date suffix pattern: {err}")))?;
        Ok(Self { date_suffix })
    }

    /// Extract the embedded date from a file name.
    ///
    /// Returns `None` when the name has no `DDMMYYYY.csv` suffix or the
    /// digits do not form a calendar date.
    pub fn date_from_name(&self, file_name: &str) -> Option<NaiveDate> {
        let caps = self.date_suffix.captures(file_name)?;
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;

        let date = NaiveDate::from_ymd_opt(year, month, day);
        if date.is_none() {
            debug!(file = file_name, "date suffix is not a calendar date");
        }
        date
    }

    /// Enumerate candidates below `root`, sorted by date descending.
    ///
    /// Directory entries are visited in file name order and the date sort is
    /// stable, so an unchanged tree always yields the same sequence.
    pub fn discover(&self, root: &Path) -> Result<Vec<SourceFile>> {
        if !root.is_dir() {
            return Err(Error::discovery(format!(
                "input directory {} does not exist or is not a directory",
                root.display()
            )));
        }

        let mut candidates = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if !file_name.ends_with(CANDIDATE_EXTENSION) {
                continue;
            }
            if let Some(date) = self.date_from_name(&file_name) {
                candidates.push(SourceFile::new(entry.path(), date));
            }
        }

        // Newest first
        candidates.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(candidates)
    }
}
