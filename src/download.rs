//! Fetches a single artifact to disk unless it is already there.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::StreamExt;
use tokio::{
    fs::{self, File},
    io::{AsyncWriteExt, BufWriter},
};
use tracing::debug;

use crate::{
    artifact::ArtifactId,
    error::TransferError,
    progress::ProgressCounter,
    remote::{Remote, RemoteResponse},
};

/// Bytes buffered before each write to disk.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// How to treat a response that is neither a success nor a 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Only 2xx bodies are written; anything else is a transfer error.
    #[default]
    Strict,
    /// Every non-404 body is written, error pages included.
    Legacy,
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// The file was already on disk; no request was made.
    Skipped,
    Fetched,
    /// The archive answered 404.
    NotFound,
    Failed(TransferError),
}

#[derive(Clone)]
pub struct Fetcher {
    remote: Arc<dyn Remote>,
    remote_root: String,
    local_root: PathBuf,
    policy: StatusPolicy,
    progress: Arc<ProgressCounter>,
}

impl Fetcher {
    pub fn new(
        remote: Arc<dyn Remote>,
        remote_root: impl Into<String>,
        local_root: impl Into<PathBuf>,
        policy: StatusPolicy,
        progress: Arc<ProgressCounter>,
    ) -> Self {
        Fetcher {
            remote,
            remote_root: remote_root.into(),
            local_root: local_root.into(),
            policy,
            progress,
        }
    }

    /// Downloads `id` into `{local_root}/{year}/{doy}/`, bumping the shared
    /// counter when a file is written.
    pub async fn fetch(&self, id: &ArtifactId) -> FetchOutcome {
        let location = id.locate(&self.remote_root, &self.local_root);

        if matches!(fs::try_exists(&location.path).await, Ok(true)) {
            debug!(path = %location.path.display(), "File already exists, skipping");
            return FetchOutcome::Skipped;
        }

        let response = match self.remote.get(&location.url).await {
            Ok(response) => response,
            Err(e) => {
                return FetchOutcome::Failed(TransferError::Request {
                    url: location.url,
                    reason: e.to_string(),
                })
            }
        };
        debug!(url = %location.url, status = response.status, "Fetched");

        if response.is_not_found() {
            return FetchOutcome::NotFound;
        }
        if !response.is_success() && self.policy == StatusPolicy::Strict {
            return FetchOutcome::Failed(TransferError::Status {
                url: location.url,
                status: response.status,
            });
        }

        match save_body(response, &location.url, &location.path).await {
            Ok(()) => {
                self.progress.increment();
                FetchOutcome::Fetched
            }
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

/// Streams the body to a `.part` file next to `path` and renames it into
/// place once complete. Nothing is left at `path` on failure.
async fn save_body(response: RemoteResponse, url: &str, path: &Path) -> Result<(), TransferError> {
    let io_err = |source| TransferError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let part_path = part_path(path);
    let result = stream_to_file(response, url, &part_path).await;

    match result {
        Ok(()) => fs::rename(&part_path, path).await.map_err(io_err),
        Err(e) => {
            let _ = fs::remove_file(&part_path).await;
            Err(e)
        }
    }
}

async fn stream_to_file(response: RemoteResponse, url: &str, part_path: &Path) -> Result<(), TransferError> {
    let io_err = |source| TransferError::Io {
        path: part_path.to_path_buf(),
        source,
    };

    let file = File::create(part_path).await.map_err(io_err)?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = response.body;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| TransferError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        writer.write_all(&chunk).await.map_err(io_err)?;
    }

    writer.flush().await.map_err(io_err)?;
    writer.get_ref().sync_all().await.map_err(io_err)?;

    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::remote::fake::FakeRemote;

    const ROOT: &str = "https://archive.test/jpl_ionosphere";

    fn artifact() -> ArtifactId {
        ArtifactId::new("ABCD", NaiveDate::from_ymd_opt(2025, 4, 17).unwrap())
    }

    fn url() -> String {
        format!("{}/2025/107/ABCD_250417.csv", ROOT)
    }

    fn fetcher(remote: Arc<FakeRemote>, dir: &TempDir, policy: StatusPolicy) -> (Fetcher, Arc<ProgressCounter>) {
        let progress = Arc::new(ProgressCounter::new());
        let fetcher = Fetcher::new(remote, ROOT, dir.path(), policy, Arc::clone(&progress));
        (fetcher, progress)
    }

    #[tokio::test]
    async fn should_fetch_into_day_directory() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::new().respond(&url(), 200, "time,tec\n0,12.5\n"));
        let (fetcher, progress) = fetcher(remote, &dir, StatusPolicy::Strict);

        assert!(matches!(fetcher.fetch(&artifact()).await, FetchOutcome::Fetched));

        let path = dir.path().join("2025/107/ABCD_250417.csv");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "time,tec\n0,12.5\n");
        assert!(!dir.path().join("2025/107/ABCD_250417.csv.part").exists());
        assert_eq!(progress.value(), 1);
    }

    #[tokio::test]
    async fn should_skip_without_request_when_present() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::new().respond(&url(), 200, "fresh"));
        let (fetcher, progress) = fetcher(Arc::clone(&remote), &dir, StatusPolicy::Strict);

        assert!(matches!(fetcher.fetch(&artifact()).await, FetchOutcome::Fetched));
        assert_eq!(remote.request_count(), 1);

        assert!(matches!(fetcher.fetch(&artifact()).await, FetchOutcome::Skipped));
        assert_eq!(remote.request_count(), 1);
        assert_eq!(progress.value(), 1);
    }

    #[tokio::test]
    async fn should_not_overwrite_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2025/107/ABCD_250417.csv");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "local copy").unwrap();

        let remote = Arc::new(FakeRemote::new().respond(&url(), 200, "remote copy"));
        let (fetcher, _) = fetcher(Arc::clone(&remote), &dir, StatusPolicy::Strict);

        assert!(matches!(fetcher.fetch(&artifact()).await, FetchOutcome::Skipped));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "local copy");
        assert_eq!(remote.request_count(), 0);
    }

    #[tokio::test]
    async fn should_write_nothing_on_404() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::new());
        let (fetcher, progress) = fetcher(remote, &dir, StatusPolicy::Strict);

        assert!(matches!(fetcher.fetch(&artifact()).await, FetchOutcome::NotFound));
        assert!(!dir.path().join("2025").exists());
        assert_eq!(progress.value(), 0);
    }

    #[tokio::test]
    async fn should_fail_on_server_error_when_strict() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::new().respond(&url(), 500, "<html>error</html>"));
        let (fetcher, progress) = fetcher(remote, &dir, StatusPolicy::Strict);

        let outcome = fetcher.fetch(&artifact()).await;
        assert!(matches!(
            outcome,
            FetchOutcome::Failed(TransferError::Status { status: 500, .. })
        ));
        assert!(!dir.path().join("2025/107/ABCD_250417.csv").exists());
        assert_eq!(progress.value(), 0);
    }

    #[tokio::test]
    async fn should_write_error_body_when_legacy() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::new().respond(&url(), 500, "<html>error</html>"));
        let (fetcher, progress) = fetcher(remote, &dir, StatusPolicy::Legacy);

        assert!(matches!(fetcher.fetch(&artifact()).await, FetchOutcome::Fetched));
        let path = dir.path().join("2025/107/ABCD_250417.csv");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html>error</html>");
        assert_eq!(progress.value(), 1);
    }

    #[tokio::test]
    async fn should_leave_no_file_when_body_breaks() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::new().broken_body(&url(), "time,tec\n0,"));
        let (fetcher, progress) = fetcher(remote, &dir, StatusPolicy::Strict);

        let outcome = fetcher.fetch(&artifact()).await;
        assert!(matches!(outcome, FetchOutcome::Failed(TransferError::Body { .. })));

        let day_dir = dir.path().join("2025/107");
        assert_eq!(std::fs::read_dir(day_dir).unwrap().count(), 0);
        assert_eq!(progress.value(), 0);
    }

    #[tokio::test]
    async fn should_report_refused_connection() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::new().refuse(&url()));
        let (fetcher, _) = fetcher(remote, &dir, StatusPolicy::Strict);

        assert!(matches!(
            fetcher.fetch(&artifact()).await,
            FetchOutcome::Failed(TransferError::Request { .. })
        ));
    }

    #[tokio::test]
    async fn should_tolerate_existing_day_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("2025/107")).unwrap();
        let remote = Arc::new(FakeRemote::new().respond(&url(), 200, "ok"));
        let (fetcher, _) = fetcher(remote, &dir, StatusPolicy::Strict);

        assert!(matches!(fetcher.fetch(&artifact()).await, FetchOutcome::Fetched));
    }

    #[test]
    fn should_make_part_path() {
        assert_eq!(
            part_path(Path::new("daily/2025/107/ABCD_250417.csv")),
            Path::new("daily/2025/107/ABCD_250417.csv.part")
        );
    }
}
