//! Processing ledger.
//!
//! Append-only set of base filenames, persisted one per line. Presence of a
//! name means its records are already in the output file.

use consolidator_core::{Error, Result};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable set of processed filenames.
#[derive(Debug)]
pub struct ProcessingLedger {
    path: PathBuf,
    entries: HashSet<String>,
}

impl ProcessingLedger {
    /// Load the ledger at `path`. A missing file is an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries: HashSet<String> = match fs::read_to_string(&path) {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(err) if err.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(err) => {
                return Err(Error::ledger(format!(
                    "cannot read {}: {err}",
                    path.display()
                )))
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "ledger loaded");

        Ok(Self { path, entries })
    }

    /// Location of the persisted ledger.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `name` has been recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// Number of recorded names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Durably record `names`. Names already present, and repeats within
    /// `names`, are not written again. Returns how many lines were appended.
    pub fn append_all<I, S>(&mut self, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fresh = Vec::new();
        let mut seen = HashSet::new();
        for name in names {
            let name = name.into();
            if !self.entries.contains(&name) && seen.insert(name.clone()) {
                fresh.push(name);
            }
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        self.write_lines(&fresh)
            .map_err(|err| Error::ledger(format!("cannot append to {}: {err}", self.path.display())))?;

        let appended = fresh.len();
        self.entries.extend(fresh);
        Ok(appended)
    }

    fn write_lines(&self, names: &[String]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for name in names {
            writeln!(writer, "{name}")?;
        }
        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ledger_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProcessingLedger::load(dir.path().join("processed.txt")).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.contains("A_01012024.csv"));
    }

    #[test]
    fn test_append_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("processed.txt");

        let mut ledger = ProcessingLedger::load(&path).unwrap();
        let appended = ledger
            .append_all(["A_01012024.csv", "B_02012024.csv"])
            .unwrap();
        assert_eq!(appended, 2);
        assert!(ledger.contains("A_01012024.csv"));

        let reloaded = ProcessingLedger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("B_02012024.csv"));
    }

    #[test]
    fn test_append_skips_known_and_repeated_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.txt");

        let mut ledger = ProcessingLedger::load(&path).unwrap();
        ledger.append_all(["A_01012024.csv"]).unwrap();
        let appended = ledger
            .append_all(["A_01012024.csv", "B_02012024.csv", "B_02012024.csv"])
            .unwrap();
        assert_eq!(appended, 1);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "A_01012024.csv\nB_02012024.csv\n");
    }

    #[test]
    fn test_load_ignores_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.txt");
        fs::write(&path, "A_01012024.csv\n\n  B_02012024.csv  \n").unwrap();

        let ledger = ProcessingLedger::load(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("B_02012024.csv"));
    }

    #[test]
    fn test_empty_append_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.txt");

        let mut ledger = ProcessingLedger::load(&path).unwrap();
        assert_eq!(ledger.append_all(Vec::<String>::new()).unwrap(), 0);
        assert!(!path.exists());
    }
}
