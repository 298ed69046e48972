//! Consolidate BANKNIFTY futures rows from a tree of dated CSV files.
//!
//! Usage:
//!   consolidate --input-dir data --output-file output/out.csv \
//!       --ledger-file output/processed_files.txt

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use consolidator_core::{Config, LedgerFlush, PathsConfig, RunConfig};
use consolidator_pipeline::ConsolidationRunner;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "consolidate")]
#[command(about = "Append deduplicated BANKNIFTY futures rows to a cumulative CSV")]
struct Args {
    /// Root of the dated input tree (files named *_DDMMYYYY.csv)
    #[arg(long, default_value = "data")]
    input_dir: PathBuf,

    /// Cumulative output CSV
    #[arg(long, default_value = "output/out.csv")]
    output_file: PathBuf,

    /// Ledger of processed filenames
    #[arg(long, default_value = "output/processed_files.txt")]
    ledger_file: PathBuf,

    /// Record files with missing columns here and skip them on later runs
    #[arg(long)]
    quarantine_file: Option<PathBuf>,

    /// When processed files are marked in the ledger
    #[arg(long, value_enum, default_value_t = FlushArg::PerFile)]
    ledger_flush: FlushArg,

    /// Write the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FlushArg {
    PerFile,
    EndOfRun,
}

impl From<FlushArg> for LedgerFlush {
    fn from(arg: FlushArg) -> Self {
        match arg {
            FlushArg::PerFile => LedgerFlush::PerFile,
            FlushArg::EndOfRun => LedgerFlush::EndOfRun,
        }
    }
}

impl Args {
    fn into_config(self) -> (Config, Option<PathBuf>) {
        let config = Config {
            paths: PathsConfig {
                input_dir: self.input_dir,
                output_file: self.output_file,
                ledger_file: self.ledger_file,
                quarantine_file: self.quarantine_file,
            },
            run: RunConfig {
                ledger_flush: self.ledger_flush.into(),
            },
        };
        (config, self.report)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::level_filters::LevelFilter::INFO.into()),
        )
        .init();

    let (config, report_path) = Args::parse().into_config();

    let runner = ConsolidationRunner::new(config).context("invalid configuration")?;
    let report = runner.run().context("consolidation run aborted")?;

    info!("{report}");

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json)
            .with_context(|| format!("cannot write report to {}", path.display()))?;
        info!(path = %path.display(), "run report written");
    }

    Ok(())
}
