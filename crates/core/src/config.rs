//! Configuration structures for the consolidator.
//!
//! Every component receives its paths and policies from a [`Config`] value
//! handed over at construction time.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for a consolidation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input, output and bookkeeping locations.
    pub paths: PathsConfig,
    /// Run behaviour.
    pub run: RunConfig,
}

impl Config {
    /// Check that the configured paths can be used together.
    pub fn validate(&self) -> Result<()> {
        let paths = &self.paths;
        if paths.output_file == paths.ledger_file {
            return Err(Error::config(format!(
                "output file and ledger file must differ (both {})",
                paths.output_file.display()
            )));
        }
        if let Some(quarantine) = &paths.quarantine_file {
            if quarantine == &paths.ledger_file || quarantine == &paths.output_file {
                return Err(Error::config(format!(
                    "quarantine file {} collides with the output or ledger file",
                    quarantine.display()
                )));
            }
        }
        Ok(())
    }
}

/// File system locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the dated input tree, scanned recursively.
    pub input_dir: PathBuf,
    /// Cumulative CSV output.
    pub output_file: PathBuf,
    /// One processed filename per line.
    pub ledger_file: PathBuf,
    /// Optional list of files rejected for missing columns.
    /// When unset, such files are retried on every run.
    pub quarantine_file: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            output_file: PathBuf::from("output/out.csv"),
            ledger_file: PathBuf::from("output/processed_files.txt"),
            quarantine_file: None,
        }
    }
}

/// When newly processed filenames are persisted to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerFlush {
    /// Mark each file right after its records are written.
    #[default]
    PerFile,
    /// Mark all files of the run in one batch once every candidate is handled.
    /// A crash between a write and the flush duplicates that file's output on
    /// the next run.
    EndOfRun,
}

/// Run behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ledger flush policy.
    pub ledger_flush: LedgerFlush,
}
