//! Artifact identity and where it lives, remotely and on disk.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::window::day_path;

pub const ARTIFACT_EXTENSION: &str = ".csv";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// One station's file for one day.
pub struct ArtifactId {
    pub station: String,
    pub date: NaiveDate,
}

impl ArtifactId {
    pub fn new(station: impl Into<String>, date: NaiveDate) -> Self {
        ArtifactId {
            station: station.into(),
            date,
        }
    }

    /// `{station}_{yyMMdd}.csv`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}{}",
            self.station,
            self.date.format("%y%m%d"),
            ARTIFACT_EXTENSION
        )
    }

    pub fn locate(&self, remote_root: &str, local_root: &Path) -> ArtifactLocation {
        let day = day_path(self.date);
        let file_name = self.file_name();

        ArtifactLocation {
            url: format!("{}/{}/{}", remote_root.trim_end_matches('/'), day, file_name),
            path: local_root.join(day).join(file_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactLocation {
    pub url: String,
    pub path: PathBuf,
}

// -- Tests -------------------------------------------------------------------
