//! Per-file outcomes and the run summary.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Why a candidate was not attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Already in the ledger, or written earlier in this run.
    AlreadyProcessed,
    /// Listed in the quarantine file.
    Quarantined,
}

/// Why an attempted file produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataReason {
    /// Required columns absent from the header.
    MissingColumns { columns: Vec<String> },
    /// No row passed the ticker filter.
    NoMatchingRows,
}

/// Terminal state of one candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Not attempted.
    Skipped { reason: SkipReason },
    /// Records appended and the file marked in the ledger.
    Written { records: usize },
    /// Attempted, nothing to write; left unmarked.
    NoData { reason: NoDataReason },
    /// Read or parse failure; left unmarked.
    Failed { error: String },
}

/// Outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub file_name: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Everything that happened in one run, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub files: Vec<FileOutcome>,
}

impl RunReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a candidate.
    pub fn record(&mut self, outcome: FileOutcome) {
        self.files.push(outcome);
    }

    /// Number of candidates seen.
    pub fn candidates(&self) -> usize {
        self.files.len()
    }

    /// Files skipped for any reason.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped { .. }))
    }

    /// Files written and marked.
    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Written { .. }))
    }

    /// Files that produced no output.
    pub fn no_data(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::NoData { .. }))
    }

    /// Files that failed to read or parse.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    /// Total output records appended in this run.
    pub fn records_written(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.status {
                FileStatus::Written { records } => records,
                _ => 0,
            })
            .sum()
    }

    /// Outcome for a base filename, if it was a candidate.
    pub fn outcome(&self, file_name: &str) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.file_name == file_name)
    }

    fn count(&self, predicate: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.status)).count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates: {} written ({} records), {} skipped, {} without data, {} failed",
            self.candidates(),
            self.written(),
            self.records_written(),
            self.skipped(),
            self.no_data(),
            self.failed()
        )
    }
}
