//! Drives one incremental sync: window, manifests, fetches, watermark.

use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use indicatif::ProgressBar;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::{
    artifact::ArtifactId,
    config::SyncConfig,
    download::{FetchOutcome, Fetcher},
    error::SyncError,
    manifest::ManifestResolver,
    progress::ProgressCounter,
    remote::Remote,
    watermark::WatermarkStore,
    window::DayWindow,
};

/// Counters for a single run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub days: usize,
    pub expected: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub not_found: u64,
    pub failed: u64,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} out of {} files downloaded.", self.succeeded, self.expected)
    }
}

type TaskResult = Result<(ArtifactId, FetchOutcome), JoinError>;

pub struct Syncer {
    config: SyncConfig,
    remote: Arc<dyn Remote>,
    store: WatermarkStore,
    bar: ProgressBar,
}

impl Syncer {
    pub fn new(config: SyncConfig, remote: Arc<dyn Remote>) -> Self {
        let store = WatermarkStore::new(&config.memory_file);

        Syncer {
            config,
            remote,
            store,
            bar: ProgressBar::hidden(),
        }
    }

    /// Reports each finished fetch on `bar`. Its length grows as manifests
    /// are resolved.
    pub fn with_progress_bar(mut self, bar: ProgressBar) -> Self {
        self.bar = bar;
        self
    }

    /// Mirrors every day after the watermark through `today`, then moves
    /// the watermark to `today`.
    ///
    /// Fails before any request if the watermark cannot be read or is not
    /// in the past. Per-artifact failures are counted, not returned.
    pub async fn run(&self, today: NaiveDate) -> Result<RunStats, SyncError> {
        let watermark = self.store.load()?;
        let window = DayWindow::between(watermark, today)?;
        info!(%watermark, %today, days = window.len(), "Syncing");

        let progress = Arc::new(ProgressCounter::new());
        let resolver = ManifestResolver::new(Arc::clone(&self.remote), &self.config.remote_root);
        let fetcher = Arc::new(Fetcher::new(
            Arc::clone(&self.remote),
            &self.config.remote_root,
            &self.config.local_root,
            self.config.status_policy,
            Arc::clone(&progress),
        ));

        let workers = self.config.workers.max(1);
        let mut tasks: JoinSet<(ArtifactId, FetchOutcome)> = JoinSet::new();
        let mut stats = RunStats {
            days: window.len(),
            ..RunStats::default()
        };

        for day in &window {
            let stations = resolver.list_artifacts(*day).await;
            info!(%day, stations = stations.len(), "Resolved manifest");

            stats.expected += stations.len() as u64;
            self.bar.inc_length(stations.len() as u64);

            if self.config.dry_run {
                continue;
            }

            for station in stations {
                // Keep at most `workers` fetches in flight.
                while tasks.len() >= workers {
                    if let Some(result) = tasks.join_next().await {
                        self.record(&mut stats, result);
                    }
                }

                let fetcher = Arc::clone(&fetcher);
                let id = ArtifactId::new(station, *day);
                tasks.spawn(async move {
                    let outcome = fetcher.fetch(&id).await;
                    (id, outcome)
                });
            }
        }

        while let Some(result) = tasks.join_next().await {
            self.record(&mut stats, result);
        }

        stats.succeeded = progress.value();
        self.bar.finish_with_message("Sync complete");

        if self.config.dry_run {
            info!(expected = stats.expected, "Dry run; watermark left at {}", watermark);
            return Ok(stats);
        }

        self.store.save(today)?;
        info!(
            path = %self.store.path().display(),
            %today,
            succeeded = stats.succeeded,
            skipped = stats.skipped,
            not_found = stats.not_found,
            failed = stats.failed,
            "Updated watermark"
        );

        Ok(stats)
    }

    fn record(&self, stats: &mut RunStats, result: TaskResult) {
        self.bar.inc(1);

        match result {
            Ok((_, FetchOutcome::Fetched)) => {}
            Ok((_, FetchOutcome::Skipped)) => stats.skipped += 1,
            Ok((id, FetchOutcome::NotFound)) => {
                debug!(station = %id.station, date = %id.date, "Not on archive");
                stats.not_found += 1;
            }
            Ok((id, FetchOutcome::Failed(e))) => {
                warn!(station = %id.station, date = %id.date, error = %e, "Download failed");
                stats.failed += 1;
            }
            Err(e) => {
                warn!(error = %e, "Fetch task aborted");
                stats.failed += 1;
            }
        }
    }
}

// -- Tests -------------------------------------------------------------------
