//! Cumulative CSV output.
//!
//! Records from every run are appended to one file. The header is written
//! once, when the file is first created.

use consolidator_core::{Error, OutputBatch, Result};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Append-only writer for the cumulative output file.
#[derive(Debug)]
pub struct OutputWriter {
    path: PathBuf,
}

impl OutputWriter {
    /// Create a writer for `path`. Nothing is touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a batch, writing the header first if the file is new or empty.
    ///
    /// Data is flushed and synced before returning the number of records
    /// written.
    pub fn append(&mut self, batch: &OutputBatch) -> Result<usize> {
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(err) if err.kind() == ErrorKind::NotFound => true,
            Err(err) => {
                return Err(Error::output(format!(
                    "cannot inspect {}: {err}",
                    self.path.display()
                )))
            }
        };
        if !needs_header && !self.header_matches(&batch.columns) {
            warn!(
                path = %self.path.display(),
                incoming = ?batch.columns,
                "output header differs from incoming columns"
            );
        }

        self.write_batch(batch, needs_header).map_err(|err| {
            Error::output(format!("cannot append to {}: {err}", self.path.display()))
        })?;

        Ok(batch.len())
    }

    fn write_batch(&self, batch: &OutputBatch, needs_header: bool) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(&batch.columns)?;
        }
        for record in &batch.records {
            writer.write_record(&record.values)?;
        }

        let file: File = writer
            .into_inner()
            .map_err(|err| Error::output(err.to_string()))?;
        file.sync_all()?;
        Ok(())
    }

    /// Whether the existing header equals `columns`. An unreadable or empty
    /// file counts as matching; rows are appended either way.
    fn header_matches(&self, columns: &[String]) -> bool {
        let mut reader = match csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(_) => return true,
        };
        match reader.records().next() {
            Some(Ok(existing)) => existing.iter().eq(columns.iter().map(String::as_str)),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consolidator_core::OutputRecord;

    fn batch(filename: &str, rows: &[(&str, f64)]) -> OutputBatch {
        let columns = ["Ticker", "Date", "Time", "Volume", "Open Interest", "Filename"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let records = rows
            .iter()
            .map(|(time, volume)| OutputRecord {
                date: "2024-01-01".into(),
                time: time.to_string(),
                ticker: "BANKNIFTYFUT".into(),
                volume: *volume,
                open_interest: 1.0,
                filename: filename.into(),
                values: vec![
                    "BANKNIFTYFUT".into(),
                    "2024-01-01".into(),
                    time.to_string(),
                    volume.to_string(),
                    "1".into(),
                    filename.into(),
                ],
            })
            .collect();
        OutputBatch { columns, records }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("out.csv");
        let mut writer = OutputWriter::new(&path);

        assert_eq!(writer.append(&batch("A_01012024.csv", &[("09:15", 300.0)])).unwrap(), 1);
        assert_eq!(
            writer
                .append(&batch("B_02012024.csv", &[("09:15", 5.0), ("09:16", 7.5)]))
                .unwrap(),
            2
        );

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Ticker,Date,Time,Volume,Open Interest,Filename\n\
             BANKNIFTYFUT,2024-01-01,09:15,300,1,A_01012024.csv\n\
             BANKNIFTYFUT,2024-01-01,09:15,5,1,B_02012024.csv\n\
             BANKNIFTYFUT,2024-01-01,09:16,7.5,1,B_02012024.csv\n"
        );
    }

    #[test]
    fn test_existing_file_gets_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "Ticker,Date,Time,Volume,Open Interest,Filename\n").unwrap();

        let mut writer = OutputWriter::new(&path);
        writer.append(&batch("A_01012024.csv", &[("09:15", 1.0)])).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("Filename").count(), 1);
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_empty_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        File::create(&path).unwrap();

        let mut writer = OutputWriter::new(&path);
        writer.append(&batch("A_01012024.csv", &[("09:15", 1.0)])).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Ticker,Date,Time"));
    }

    #[test]
    fn test_unwritable_target_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let mut writer = OutputWriter::new(dir.path());

        let result = writer.append(&batch("A_01012024.csv", &[("09:15", 1.0)]));
        assert!(matches!(result, Err(Error::Output(_))));
    }

    #[test]
    fn test_header_drift_appends_without_new_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "Ticker,Date,Time,Volume,Filename\n").unwrap();

        let mut writer = OutputWriter::new(&path);
        let incoming = batch("A_01012024.csv", &[("09:15", 1.0)]);
        assert!(!writer.header_matches(&incoming.columns));

        assert_eq!(writer.append(&incoming).unwrap(), 1);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Ticker,Date,Time,Volume,Filename\n\
             BANKNIFTYFUT,2024-01-01,09:15,1,1,A_01012024.csv\n"
        );
    }

    #[test]
    fn test_matching_header_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = OutputWriter::new(&path);
        let incoming = batch("A_01012024.csv", &[("09:15", 1.0)]);
        writer.append(&incoming).unwrap();

        assert!(writer.header_matches(&incoming.columns));
    }

    #[test]
    fn test_uninspectable_target_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        // Regular file where a directory is expected: not a NotFound error.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut writer = OutputWriter::new(blocker.join("out.csv"));

        let result = writer.append(&batch("A_01012024.csv", &[("09:15", 1.0)]));

        assert!(matches!(result, Err(Error::Output(message)) if message.starts_with("cannot inspect")));
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "");
    }
}
