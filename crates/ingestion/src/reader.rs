//! Whole-file CSV loading.

use consolidator_core::{Result, Table};
use std::io::Read;
use std::path::Path;

/// Load a CSV file with a header row into a [`Table`].
///
/// Header names are trimmed and a leading byte order mark is dropped.
/// Records with a different number of cells than the header are an error.
pub fn read_table(path: &Path) -> Result<Table> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    collect_table(reader)
}

/// Same as [`read_table`] for any reader.
pub fn read_table_from<R: Read>(input: R) -> Result<Table> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input);
    collect_table(reader)
}

fn collect_table<R: Read>(mut reader: csv::Reader<R>) -> Result<Table> {
    let columns = reader
        .headers()?
        .iter()
        .map(|name| name.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::new(columns, records))
}
