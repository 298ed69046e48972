//! Input side of the consolidator.
//!
//! This crate handles:
//! - Discovery of dated input files (newest first)
//! - Whole-file CSV loading
//! - BANKNIFTY futures filtering and (Date, Time) aggregation

pub mod aggregator;
pub mod discovery;
pub mod reader;

pub use aggregator::{aggregate, is_banknifty_future, Aggregation};
pub use discovery::FileDiscovery;
pub use reader::{read_table, read_table_from};
