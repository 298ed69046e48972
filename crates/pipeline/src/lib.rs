//! Run orchestration for the consolidator.
//!
//! This crate provides:
//! - The processing ledger (which files are already handled)
//! - The cumulative output writer
//! - The per-run state machine and its report

pub mod ledger;
pub mod report;
pub mod runner;
pub mod writer;

pub use ledger::ProcessingLedger;
pub use report::{FileOutcome, FileStatus, NoDataReason, RunReport, SkipReason};
pub use runner::ConsolidationRunner;
pub use writer::OutputWriter;
