//! Core data types for the consolidator.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Instrument identifier column.
pub const TICKER: &str = "Ticker";
/// Time-of-day token column.
pub const TIME: &str = "Time";
/// Trading date token column.
pub const DATE: &str = "Date";
/// Traded volume column (summed per group).
pub const VOLUME: &str = "Volume";
/// Open interest column (summed per group).
pub const OPEN_INTEREST: &str = "Open Interest";
/// Column appended to every output record.
pub const FILENAME: &str = "Filename";

/// Columns every input file must carry, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 5] = [TICKER, TIME, DATE, VOLUME, OPEN_INTEREST];

/// A dated input file found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Full path of the file.
    pub path: PathBuf,
    /// Date embedded in the `DDMMYYYY` filename suffix.
    pub date: NaiveDate,
}

impl SourceFile {
    /// Create a new source file.
    pub fn new(path: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            path: path.into(),
            date,
        }
    }

    /// Base filename, the key used by the ledger.
    pub fn file_name(&self) -> String {
        base_name(&self.path)
    }
}

/// Base name of a path as an owned string (lossy for non UTF-8 names).
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Raw contents of one input file: header plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Header names, in file order.
    pub columns: Vec<String>,
    /// Data records; each has one cell per column.
    pub records: Vec<Vec<String>>,
}

impl Table {
    /// Create a table from a header and its records.
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Self {
        Self { columns, records }
    }

    /// Number of data records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no data records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Column positions of the required fields within a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Full header, in file order.
    pub columns: Vec<String>,
    ticker: usize,
    time: usize,
    date: usize,
    volume: usize,
    open_interest: usize,
}

impl Schema {
    /// Resolve the required columns against a header.
    ///
    /// On failure returns every missing required column, in
    /// [`REQUIRED_COLUMNS`] order.
    pub fn resolve(columns: &[String]) -> std::result::Result<Self, Vec<String>> {
        let position = |name: &str| columns.iter().position(|c| c == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| position(**name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        // All present, checked above.
        let index = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            columns: columns.to_vec(),
            ticker: index(TICKER),
            time: index(TIME),
            date: index(DATE),
            volume: index(VOLUME),
            open_interest: index(OPEN_INTEREST),
        })
    }

    /// Raw ticker cell of a record, `None` when empty or absent.
    ///
    /// Lets a caller filter records before paying for [`Row::from_fields`].
    pub fn ticker<'a>(&self, values: &'a [String]) -> Option<&'a str> {
        values
            .get(self.ticker)
            .map(String::as_str)
            .filter(|ticker| !ticker.is_empty())
    }

    /// Index of the Volume column.
    pub fn volume_index(&self) -> usize {
        self.volume
    }

    /// Index of the Open Interest column.
    pub fn open_interest_index(&self) -> usize {
        self.open_interest
    }
}

/// One typed input row.
///
/// The required fields are parsed out; `values` keeps every original cell so
/// passthrough columns survive unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Instrument identifier; `None` when the cell is empty.
    pub ticker: Option<String>,
    /// Time token, compared exactly.
    pub time: String,
    /// Date token, compared exactly.
    pub date: String,
    /// Traded volume; `None` when the cell is blank.
    pub volume: Option<f64>,
    /// Open interest; `None` when the cell is blank.
    pub open_interest: Option<f64>,
    /// All cells in header order.
    pub values: Vec<String>,
}

impl Row {
    /// Build a typed row from raw cells. `line` is used for error reporting.
    pub fn from_fields(schema: &Schema, values: Vec<String>, line: u64) -> Result<Self> {
        let ticker = cell(&values, schema.ticker, TICKER, line)?;
        let ticker = (!ticker.is_empty()).then(|| ticker.to_string());
        let time = cell(&values, schema.time, TIME, line)?.to_string();
        let date = cell(&values, schema.date, DATE, line)?.to_string();
        let volume = parse_quantity(cell(&values, schema.volume, VOLUME, line)?, VOLUME, line)?;
        let open_interest = parse_quantity(
            cell(&values, schema.open_interest, OPEN_INTEREST, line)?,
            OPEN_INTEREST,
            line,
        )?;

        Ok(Self {
            ticker,
            time,
            date,
            volume,
            open_interest,
            values,
        })
    }
}

fn cell<'a>(values: &'a [String], index: usize, name: &str, line: u64) -> Result<&'a str> {
    values
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| Error::parse(line, format!("missing {name} field")))
}

/// Blank cells are missing values; anything else must parse as a number.
fn parse_quantity(raw: &str, name: &str, line: u64) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| Error::parse(line, format!("{name} is not a number: {raw:?}")))
}

/// Format a summed quantity for output; integral values print without a fraction.
#[inline]
pub fn format_quantity(value: f64) -> String {
    value.to_string()
}

/// One aggregated output row: the representative row of a (Date, Time) group
/// with summed quantities and the source filename appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    /// Date token of the group.
    pub date: String,
    /// Time token of the group.
    pub time: String,
    /// Ticker of the representative row.
    pub ticker: String,
    /// Summed volume of the group.
    pub volume: f64,
    /// Summed open interest of the group.
    pub open_interest: f64,
    /// Source file base name.
    pub filename: String,
    /// Cells as written to the output, matching [`OutputBatch::columns`].
    pub values: Vec<String>,
}

/// Output of one file: shared column order plus its records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputBatch {
    /// Input header followed by [`FILENAME`].
    pub columns: Vec<String>,
    /// Records sorted by (Date, Time, Ticker).
    pub records: Vec<OutputRecord>,
}

impl OutputBatch {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schema_resolves_required_columns() {
        let columns = header(&["Ticker", "Date", "Time", "Open", "Volume", "Open Interest"]);
        let schema = Schema::resolve(&columns).unwrap();
        assert_eq!(schema.volume_index(), 4);
        assert_eq!(schema.open_interest_index(), 5);
    }

    #[test]
    fn test_schema_reports_missing_in_canonical_order() {
        let columns = header(&["Volume", "Ticker"]);
        let missing = Schema::resolve(&columns).unwrap_err();
        assert_eq!(missing, vec!["Time", "Date", "Open Interest"]);
    }

    #[test]
    fn test_row_from_fields() {
        let columns = header(&["Ticker", "Date", "Time", "Volume", "Open Interest", "Close"]);
        let schema = Schema::resolve(&columns).unwrap();
        let row = Row::from_fields(
            &schema,
            header(&["BANKNIFTYFUT", "2024-01-01", "09:15", "100", " 12.5 ", "48000"]),
            2,
        )
        .unwrap();

        assert_eq!(row.ticker.as_deref(), Some("BANKNIFTYFUT"));
        assert_eq!(row.date, "2024-01-01");
        assert_eq!(row.time, "09:15");
        assert_relative_eq!(row.volume.unwrap(), 100.0);
        assert_relative_eq!(row.open_interest.unwrap(), 12.5);
        assert_eq!(row.values[5], "48000");
    }

    #[test]
    fn test_row_blank_quantity_is_missing() {
        let columns = header(&["Ticker", "Date", "Time", "Volume", "Open Interest"]);
        let schema = Schema::resolve(&columns).unwrap();
        let row = Row::from_fields(&schema, header(&["X", "d", "t", "5", "  "]), 3).unwrap();
        assert_relative_eq!(row.volume.unwrap(), 5.0);
        assert!(row.open_interest.is_none());
    }

    #[test]
    fn test_schema_raw_ticker() {
        let columns = header(&["Date", "Ticker", "Time", "Volume", "Open Interest"]);
        let schema = Schema::resolve(&columns).unwrap();
        assert_eq!(schema.ticker(&header(&["d", "NIFTY", "t", "x", ""])), Some("NIFTY"));
        assert_eq!(schema.ticker(&header(&["d", "", "t", "1", "1"])), None);
        assert_eq!(schema.ticker(&header(&["d"])), None);
    }

    #[test]
    fn test_row_empty_ticker_is_none() {
        let columns = header(&["Ticker", "Date", "Time", "Volume", "Open Interest"]);
        let schema = Schema::resolve(&columns).unwrap();
        let row = Row::from_fields(&schema, header(&["", "d", "t", "1", "2"]), 3).unwrap();
        assert!(row.ticker.is_none());
    }

    #[test]
    fn test_row_rejects_non_numeric_volume() {
        let columns = header(&["Ticker", "Date", "Time", "Volume", "Open Interest"]);
        let schema = Schema::resolve(&columns).unwrap();
        let err = Row::from_fields(&schema, header(&["X", "d", "t", "abc", "2"]), 4).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 4, .. }));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(305.0), "305");
        assert_eq!(format_quantity(30.5), "30.5");
    }

    #[test]
    fn test_source_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let file = SourceFile::new("data/jan/TRADES_01012024.csv", date);
        assert_eq!(file.file_name(), "TRADES_01012024.csv");
    }
}
