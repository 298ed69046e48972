//! Consolidation run.
//!
//! Drives every candidate file through
//! `PENDING -> SKIPPED | WRITTEN+MARKED | NO_DATA | FAILED`.
//! Per-file problems end up in the [`RunReport`]; only output and ledger
//! write failures abort the run.

use crate::ledger::ProcessingLedger;
use crate::report::{FileOutcome, FileStatus, NoDataReason, RunReport, SkipReason};
use crate::writer::OutputWriter;
use consolidator_core::{Config, LedgerFlush, Result, SourceFile};
use consolidator_ingestion::{aggregate, read_table, Aggregation, FileDiscovery};
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Runs the consolidation over the configured input tree.
pub struct ConsolidationRunner {
    config: Config,
    discovery: FileDiscovery,
}

/// Mutable state of one run.
struct RunState {
    ledger: ProcessingLedger,
    quarantine: Option<ProcessingLedger>,
    writer: OutputWriter,
    /// Written in this run; guards against a base name seen twice.
    written: HashSet<String>,
    /// Awaiting the end-of-run ledger flush.
    pending: Vec<String>,
}

impl RunState {
    /// Mark every file still awaiting the end-of-run flush.
    fn flush_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let marked = self.ledger.append_all(self.pending.drain(..))?;
        info!(marked, "ledger updated");
        Ok(())
    }
}

impl ConsolidationRunner {
    /// Create a runner. The configuration is validated here.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            discovery: FileDiscovery::new()?,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process every pending candidate once.
    pub fn run(&self) -> Result<RunReport> {
        let paths = &self.config.paths;

        let mut state = RunState {
            ledger: ProcessingLedger::load(&paths.ledger_file)?,
            quarantine: paths
                .quarantine_file
                .as_ref()
                .map(ProcessingLedger::load)
                .transpose()?,
            writer: OutputWriter::new(&paths.output_file),
            written: HashSet::new(),
            pending: Vec::new(),
        };

        let candidates = self.discovery.discover(&paths.input_dir)?;
        info!(
            input = %paths.input_dir.display(),
            candidates = candidates.len(),
            already_processed = state.ledger.len(),
            "starting consolidation"
        );

        let mut report = RunReport::new();
        for source in candidates {
            let status = match self.handle(&source, &mut state) {
                Ok(status) => status,
                Err(err) => {
                    // Files already synced to the output must not be appended again.
                    if let Err(flush_err) = state.flush_pending() {
                        error!(error = %flush_err, "ledger flush failed after run error");
                    }
                    return Err(err);
                }
            };
            report.record(FileOutcome {
                file_name: source.file_name(),
                path: source.path,
                date: source.date,
                status,
            });
        }

        state.flush_pending()?;

        info!(
            candidates = report.candidates(),
            written = report.written(),
            records = report.records_written(),
            skipped = report.skipped(),
            no_data = report.no_data(),
            failed = report.failed(),
            "all files processed"
        );

        Ok(report)
    }

    /// Resolve one candidate. `Err` only for output or ledger failures.
    fn handle(&self, source: &SourceFile, state: &mut RunState) -> Result<FileStatus> {
        let name = source.file_name();
        let path = source.path.display();

        if state.ledger.contains(&name) || state.written.contains(&name) {
            info!(file = %path, "skipping, already processed");
            return Ok(FileStatus::Skipped {
                reason: SkipReason::AlreadyProcessed,
            });
        }
        if state.quarantine.as_ref().is_some_and(|q| q.contains(&name)) {
            info!(file = %path, "skipping, quarantined");
            return Ok(FileStatus::Skipped {
                reason: SkipReason::Quarantined,
            });
        }

        let aggregation = match read_table(&source.path).and_then(|table| aggregate(table, &name)) {
            Ok(aggregation) => aggregation,
            Err(err) => {
                error!(file = %path, error = %err, "error processing file");
                return Ok(FileStatus::Failed {
                    error: err.to_string(),
                });
            }
        };

        match aggregation {
            Aggregation::Records(batch) => {
                let records = state.writer.append(&batch)?;
                state.written.insert(name.clone());
                match self.config.run.ledger_flush {
                    LedgerFlush::PerFile => {
                        state.ledger.append_all([name])?;
                    }
                    LedgerFlush::EndOfRun => state.pending.push(name),
                }
                info!(file = %path, records, "file processed");
                Ok(FileStatus::Written { records })
            }
            Aggregation::Empty => {
                warn!(file = %path, "no data to write after filtering");
                Ok(FileStatus::NoData {
                    reason: NoDataReason::NoMatchingRows,
                })
            }
            Aggregation::MissingColumns(columns) => {
                warn!(file = %path, missing = %columns.join(", "), "missing required columns");
                if let Some(quarantine) = state.quarantine.as_mut() {
                    quarantine.append_all([name])?;
                    info!(file = %path, "file quarantined");
                }
                Ok(FileStatus::NoData {
                    reason: NoDataReason::MissingColumns { columns },
                })
            }
        }
    }
}
