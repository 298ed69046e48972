//! Core types and configuration for the BANKNIFTY futures consolidator.
//!
//! This crate provides shared types used across all other crates:
//! - Input/output record types (source files, rows, output batches)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, LedgerFlush, PathsConfig, RunConfig};
pub use error::{Error, Result};
pub use types::*;
