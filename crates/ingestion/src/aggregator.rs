//! Per-file filtering and duplicate-timestamp aggregation.
//!
//! Rows of BANKNIFTY futures that share an exact (Date, Time) pair collapse
//! into one record: the highest-volume row of the group, carrying the summed
//! Volume and Open Interest of the whole group.

use consolidator_core::{
    format_quantity, OutputBatch, OutputRecord, Result, Row, Schema, Table, FILENAME,
};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// Instrument family kept by the filter.
pub const TICKER_PREFIX: &str = "BANKNIFTY";

/// Option-contract markers; tickers containing any of them are dropped.
pub const EXCLUDED_MARKERS: [&str; 2] = ["CE", "PE"];

/// Whether a ticker names a BANKNIFTY future (not an option contract).
/// A missing ticker never matches.
#[inline]
pub fn is_banknifty_future(ticker: Option<&str>) -> bool {
    match ticker {
        Some(t) => {
            t.starts_with(TICKER_PREFIX) && !EXCLUDED_MARKERS.iter().any(|m| t.contains(*m))
        }
        None => false,
    }
}

/// Result of aggregating one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// At least one group survived.
    Records(OutputBatch),
    /// No row passed the ticker filter.
    Empty,
    /// Required columns absent from the header; nothing else was looked at.
    MissingColumns(Vec<String>),
}

/// A (Date, Time) group that's currently being accumulated.
///
/// Blank quantities are skipped: they add nothing to the sums and never win
/// the maximum-volume pick.
#[derive(Debug, Clone)]
struct GroupInProgress {
    representative: Row,
    max_volume: Option<OrderedFloat<f64>>,
    volume: f64,
    open_interest: f64,
}

impl GroupInProgress {
    fn new(row: Row) -> Self {
        Self {
            max_volume: row.volume.map(OrderedFloat),
            volume: row.volume.unwrap_or_default(),
            open_interest: row.open_interest.unwrap_or_default(),
            representative: row,
        }
    }

    fn add_row(&mut self, row: Row) {
        self.volume += row.volume.unwrap_or_default();
        self.open_interest += row.open_interest.unwrap_or_default();
        // Strictly greater: the first row reaching the maximum stays.
        if let Some(volume) = row.volume.map(OrderedFloat) {
            if self.max_volume.map_or(true, |max| volume > max) {
                self.max_volume = Some(volume);
                self.representative = row;
            }
        }
    }

    fn into_record(self, schema: &Schema, file_name: &str) -> OutputRecord {
        let Row {
            ticker,
            time,
            date,
            mut values,
            ..
        } = self.representative;

        values[schema.volume_index()] = format_quantity(self.volume);
        values[schema.open_interest_index()] = format_quantity(self.open_interest);
        values.push(file_name.to_string());

        OutputRecord {
            date,
            time,
            ticker: ticker.unwrap_or_default(),
            volume: self.volume,
            open_interest: self.open_interest,
            filename: file_name.to_string(),
            values,
        }
    }
}

/// Filter, group and sum the rows of one file.
///
/// `file_name` is the base name stamped into the Filename column. Rows are
/// filtered on their raw ticker first, so only BANKNIFTY futures are typed.
/// Returns an error only when such a row cannot be typed (e.g. a non-numeric
/// Volume).
pub fn aggregate(table: Table, file_name: &str) -> Result<Aggregation> {
    let schema = match Schema::resolve(&table.columns) {
        Ok(schema) => schema,
        Err(missing) => return Ok(Aggregation::MissingColumns(missing)),
    };

    let mut groups: BTreeMap<(String, String), GroupInProgress> = BTreeMap::new();
    for (index, values) in table.records.into_iter().enumerate() {
        if !is_banknifty_future(schema.ticker(&values)) {
            continue;
        }
        // Header is line 1
        let row = Row::from_fields(&schema, values, index as u64 + 2)?;

        let key = (row.date.clone(), row.time.clone());
        match groups.get_mut(&key) {
            Some(group) => group.add_row(row),
            None => {
                groups.insert(key, GroupInProgress::new(row));
            }
        }
    }

    if groups.is_empty() {
        return Ok(Aggregation::Empty);
    }

    let mut records: Vec<OutputRecord> = groups
        .into_values()
        .map(|group| group.into_record(&schema, file_name))
        .collect();
    records.sort_by(|a, b| (&a.date, &a.time, &a.ticker).cmp(&(&b.date, &b.time, &b.ticker)));

    let mut columns = schema.columns;
    columns.push(FILENAME.to_string());

    Ok(Aggregation::Records(OutputBatch { columns, records }))
}
