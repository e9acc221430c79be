//! Discovers which stations published a file on a given day.
//!
//! Each day directory on the archive carries an `MD5SUMS` listing with one
//! `<checksum> <filename>` pair per line.

use std::{collections::BTreeSet, sync::Arc};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{artifact::ARTIFACT_EXTENSION, remote::Remote, window::day_path};

pub const MANIFEST_NAME: &str = "MD5SUMS";

pub fn manifest_url(remote_root: &str, day: NaiveDate) -> String {
    format!(
        "{}/{}/{}",
        remote_root.trim_end_matches('/'),
        day_path(day),
        MANIFEST_NAME
    )
}

/// Station ids listed in a manifest.
///
/// Lines that do not split into exactly two tokens are ignored, as are
/// files without the artifact extension or without a `{station}_` prefix.
pub fn parse_manifest(text: &str) -> BTreeSet<String> {
    text.lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [_checksum, file_name] => Some(*file_name),
                _ => None,
            }
        })
        .filter(|file_name| file_name.ends_with(ARTIFACT_EXTENSION))
        .filter_map(|file_name| file_name.split_once('_'))
        .map(|(station, _)| station)
        .filter(|station| !station.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct ManifestResolver {
    remote: Arc<dyn Remote>,
    remote_root: String,
}

impl ManifestResolver {
    pub fn new(remote: Arc<dyn Remote>, remote_root: impl Into<String>) -> Self {
        ManifestResolver {
            remote,
            remote_root: remote_root.into(),
        }
    }

    /// Stations available on `day`. An unreachable or non-200 manifest
    /// means no stations for that day; the run carries on.
    pub async fn list_artifacts(&self, day: NaiveDate) -> BTreeSet<String> {
        let url = manifest_url(&self.remote_root, day);
        debug!(%day, %url, "Getting station names");

        let response = match self.remote.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%day, %url, error = %e, "Could not retrieve manifest");
                return BTreeSet::new();
            }
        };

        if response.status != 200 {
            warn!(%day, %url, status = response.status, "Could not retrieve manifest");
            return BTreeSet::new();
        }

        match response.text().await {
            Ok(text) => {
                let stations = parse_manifest(&text);
                if stations.is_empty() {
                    // Typical of an unauthenticated request answered by a login page.
                    warn!(%day, %url, "Manifest lists no station files");
                }
                stations
            }
            Err(e) => {
                warn!(%day, %url, error = %e, "Manifest body was truncated");
                BTreeSet::new()
            }
        }
    }
}

// -- Tests -------------------------------------------------------------------
