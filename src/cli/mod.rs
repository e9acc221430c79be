//! Command line interface.

pub mod command;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::{SyncConfig, DEFAULT_LOCAL_ROOT, DEFAULT_MEMORY_FILE, DEFAULT_REMOTE_ROOT, DEFAULT_WORKERS},
    download::StatusPolicy,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download every file published since the last run
    Sync(SyncArgs),
    /// Show the watermark and the days still to fetch
    Status {
        /// File holding the last completed day
        #[arg(long, default_value = DEFAULT_MEMORY_FILE)]
        memory_file: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Archive root containing `{year}/{day-of-year}/` directories
    #[arg(long, default_value = DEFAULT_REMOTE_ROOT)]
    pub remote_root: String,

    /// Directory the archive is mirrored into
    #[arg(long, default_value = DEFAULT_LOCAL_ROOT)]
    pub local_root: PathBuf,

    /// File holding the last completed day
    #[arg(long, default_value = DEFAULT_MEMORY_FILE)]
    pub memory_file: PathBuf,

    /// Concurrent downloads
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Save response bodies for any status except 404, as earlier releases did
    #[arg(long)]
    pub legacy_status: bool,

    /// Count available files without downloading or moving the watermark
    #[arg(long)]
    pub dry_run: bool,

    /// Run even if no .netrc file is found
    #[arg(long)]
    pub skip_credential_check: bool,
}

impl From<&SyncArgs> for SyncConfig {
    fn from(args: &SyncArgs) -> Self {
        SyncConfig {
            remote_root: args.remote_root.clone(),
            local_root: args.local_root.clone(),
            memory_file: args.memory_file.clone(),
            workers: args.workers,
            status_policy: if args.legacy_status {
                StatusPolicy::Legacy
            } else {
                StatusPolicy::Strict
            },
            dry_run: args.dry_run,
        }
    }
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let style = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    ProgressBar::new(size).with_message(message).with_style(style)
}

// -- Tests -------------------------------------------------------------------
