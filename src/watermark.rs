//! Persists the last day for which a sync fully completed.
//!
//! The record is a single `last_file_download=YYYY-MM-DD` line.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use crate::error::ConfigError;

pub const WATERMARK_KEY: &str = "last_file_download";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        WatermarkStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the watermark. Fails if the file is missing, has no
    /// `last_file_download` entry, or the date does not parse.
    pub fn load(&self) -> Result<NaiveDate, ConfigError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| ConfigError::Unreadable {
            path: self.path.clone(),
            source,
        })?;

        parse_record(&contents, &self.path)
    }

    /// Replaces the whole record with `date`.
    ///
    /// Written to a temp file beside the target and renamed over it, so a
    /// failed write leaves the previous record intact.
    pub fn save(&self, date: NaiveDate) -> Result<(), ConfigError> {
        let unwritable = |source| ConfigError::Unwritable {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(unwritable)?;
        write!(tmp, "{}={}", WATERMARK_KEY, date.format(DATE_FORMAT)).map_err(unwritable)?;
        tmp.as_file().sync_all().map_err(unwritable)?;
        tmp.persist(&self.path).map_err(|e| unwritable(e.error))?;

        Ok(())
    }
}

fn parse_record(contents: &str, path: &Path) -> Result<NaiveDate, ConfigError> {
    let value = contents
        .lines()
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == WATERMARK_KEY)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingDate {
            path: path.to_path_buf(),
        })?;

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ConfigError::InvalidDate {
        path: path.to_path_buf(),
        value: value.to_string(),
    })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn should_load_watermark() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.txt");
        fs::write(&path, "last_file_download=2025-04-17").unwrap();

        let store = WatermarkStore::new(&path);
        assert_eq!(store.load().unwrap(), date(2025, 4, 17));
    }

    #[test]
    fn should_find_key_among_other_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.txt");
        fs::write(&path, "# mirror state\nowner=ops\n last_file_download = 2024-12-31 \n").unwrap();

        let store = WatermarkStore::new(&path);
        assert_eq!(store.load().unwrap(), date(2024, 12, 31));
    }

    #[test]
    fn should_fail_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let store = WatermarkStore::new(dir.path().join("nope.txt"));

        assert!(matches!(store.load(), Err(ConfigError::Unreadable { .. })));
    }

    #[test]
    fn should_fail_when_key_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.txt");
        fs::write(&path, "something_else=2025-04-17\n").unwrap();

        let store = WatermarkStore::new(&path);
        assert!(matches!(store.load(), Err(ConfigError::MissingDate { .. })));
    }

    #[test]
    fn should_fail_on_ambiguous_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.txt");

        for bad in ["04/17/2025", "2025-02-30", "2025-4", "yesterday"] {
            fs::write(&path, format!("last_file_download={}", bad)).unwrap();
            let store = WatermarkStore::new(&path);
            assert!(
                matches!(store.load(), Err(ConfigError::InvalidDate { .. })),
                "accepted `{}`",
                bad
            );
        }
    }

    #[test]
    fn should_replace_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.txt");
        fs::write(&path, "last_file_download=2025-04-17\nstale trailing content that is much longer\n")
            .unwrap();

        let store = WatermarkStore::new(&path);
        store.save(date(2025, 4, 19)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "last_file_download=2025-04-19");
        assert_eq!(store.load().unwrap(), date(2025, 4, 19));
    }

    #[test]
    fn should_create_record_when_absent() {
        let dir = TempDir::new().unwrap();
        let store = WatermarkStore::new(dir.path().join("memory.txt"));

        store.save(date(2025, 1, 1)).unwrap();
        assert_eq!(store.load().unwrap(), date(2025, 1, 1));
    }
}
