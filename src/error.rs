//! Error types for the sync engine.
//!
//! Fatal errors (`ConfigError`, `WindowError`) abort a run before the
//! watermark is touched. `TransferError` is per-artifact and never aborts
//! sibling fetches.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// The watermark record could not be read or understood.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read watermark file `{path}`: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Date not present in watermark file `{path}`")]
    MissingDate { path: PathBuf },

    #[error("Invalid date `{value}` in watermark file `{path}`")]
    InvalidDate { path: PathBuf, value: String },

    #[error("Cannot write watermark file `{path}`: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The day window between the watermark and today is empty or inverted.
#[derive(Error, Debug, PartialEq)]
#[error("There is an issue with your dates: {today} is <= {watermark}")]
pub struct WindowError {
    pub watermark: NaiveDate,
    pub today: NaiveDate,
}

/// A single artifact failed to transfer.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Request to `{url}` failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Unexpected status {status} from `{url}`")]
    Status { url: String, status: u16 },

    #[error("Error reading body of `{url}`: {reason}")]
    Body { url: String, reason: String },

    #[error("Cannot write `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error for a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Window(#[from] WindowError),
}
