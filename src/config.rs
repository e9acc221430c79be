//! Run configuration. Defaults mirror the public CDDIS layout.

use std::path::PathBuf;

use crate::download::StatusPolicy;

pub const DEFAULT_REMOTE_ROOT: &str = "https://cddis.nasa.gov/archive/gnss/products/realtime/jpl_ionosphere/";
pub const DEFAULT_LOCAL_ROOT: &str = "daily";
pub const DEFAULT_MEMORY_FILE: &str = "memory.txt";
pub const DEFAULT_WORKERS: usize = 10;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL holding the `{year}/{doy}/` directories.
    pub remote_root: String,
    /// Local directory the archive layout is mirrored into.
    pub local_root: PathBuf,
    /// File holding the `last_file_download=` watermark.
    pub memory_file: PathBuf,
    /// Maximum fetches in flight.
    pub workers: usize,
    pub status_policy: StatusPolicy,
    /// Resolve manifests and count, but fetch nothing and keep the watermark.
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            remote_root: DEFAULT_REMOTE_ROOT.to_string(),
            local_root: PathBuf::from(DEFAULT_LOCAL_ROOT),
            memory_file: PathBuf::from(DEFAULT_MEMORY_FILE),
            workers: DEFAULT_WORKERS,
            status_policy: StatusPolicy::default(),
            dry_run: false,
        }
    }
}
