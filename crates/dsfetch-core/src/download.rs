//! Entry points: read a manifest and fetch everything it names into a cache
//! directory, or report what such a run would do.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::batch::{BatchOptions, BatchReport, BatchRunner, DEFAULT_CONCURRENCY};
use crate::cache_gate::CacheGate;
use crate::control::CancelToken;
use crate::downloader::{ProtocolFetcher, TransferOptions, Transport};
use crate::error::DownloadError;
use crate::manifest;
use crate::resolver::{self, ResolvedTarget};
use crate::retry::RetryPolicy;

/// Options for [`download`].
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Refetch even when a cached file is present.
    pub force: bool,
    /// Fetches in flight at once.
    pub concurrency: usize,
    /// Total attempts per entry, counting the first. 0 behaves as 1.
    pub retries: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    pub transfer: TransferOptions,
    /// Set from another thread to stop the batch early.
    pub cancel: CancelToken,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            force: false,
            concurrency: DEFAULT_CONCURRENCY,
            retries: retry.max_attempts,
            retry_base_delay: retry.base_delay,
            retry_max_delay: retry.max_delay,
            transfer: TransferOptions::default(),
            cancel: CancelToken::new(),
        }
    }
}

impl DownloadOptions {
    fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            force: self.force,
            concurrency: self.concurrency,
            retry: RetryPolicy {
                base_delay: self.retry_base_delay,
                max_delay: self.retry_max_delay,
                ..RetryPolicy::with_attempts(self.retries)
            },
        }
    }
}

/// A resolved target and whether a run would fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTarget {
    pub target: ResolvedTarget,
    pub will_fetch: bool,
}

/// Fetch every entry of the manifest at `manifest_path` into `output_dir`
/// over libcurl.
///
/// Returns `Err` only for batch-fatal problems found before any transfer
/// (unreadable or malformed manifest, name collisions, unusable output
/// directory). Per-entry failures are in the returned report.
pub async fn download(
    manifest_path: &Path,
    output_dir: &Path,
    opts: &DownloadOptions,
) -> Result<BatchReport, DownloadError> {
    let transport = Arc::new(ProtocolFetcher::new(opts.transfer.clone()));
    download_with(transport, manifest_path, output_dir, opts).await
}

/// Like [`download`] with a caller-supplied transport.
pub async fn download_with(
    transport: Arc<dyn Transport>,
    manifest_path: &Path,
    output_dir: &Path,
    opts: &DownloadOptions,
) -> Result<BatchReport, DownloadError> {
    let targets = load_targets(manifest_path, output_dir)?;
    tracing::info!(
        manifest = %manifest_path.display(),
        output_dir = %output_dir.display(),
        entries = targets.len(),
        "manifest resolved"
    );
    let runner = BatchRunner::new(transport);
    Ok(runner.run(&targets, &opts.batch_options(), &opts.cancel).await)
}

/// Resolve the manifest and check the cache without touching the network.
pub fn plan(
    manifest_path: &Path,
    output_dir: &Path,
    force: bool,
) -> Result<Vec<PlannedTarget>, DownloadError> {
    let gate = CacheGate::new(force);
    Ok(load_targets(manifest_path, output_dir)?
        .into_iter()
        .map(|target| PlannedTarget {
            will_fetch: gate.should_fetch(&target),
            target,
        })
        .collect())
}

fn load_targets(
    manifest_path: &Path,
    output_dir: &Path,
) -> Result<Vec<ResolvedTarget>, DownloadError> {
    let entries = manifest::parse_file(manifest_path)?;
    let output_dir = absolute_dir(output_dir)?;
    resolver::resolve(&entries, &output_dir)
}

fn absolute_dir(dir: &Path) -> Result<PathBuf, DownloadError> {
    if dir.as_os_str().is_empty() {
        return Err(DownloadError::OutputDir {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty path"),
        });
    }
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .map_err(|source| DownloadError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, FetchError};
    use crate::storage::PartFile;
    use url::Url;

    struct Fixed;

    impl Transport for Fixed {
        fn stream(&self, _url: &Url, out: &mut PartFile, _cancel: &CancelToken) -> Result<u64, FetchError> {
            out.write_chunk(b"col_a\tcol_b\n")
                .map_err(|e| FetchError::local_io("write", e))?;
            Ok(out.bytes_written())
        }
    }

    fn write_manifest(dir: &Path, raw: &str) -> PathBuf {
        let path = dir.join("download.yaml");
        std::fs::write(&path, raw).unwrap();
        path
    }

    #[test]
    fn batch_options_clamp_retries() {
        let opts = DownloadOptions {
            retries: 0,
            ..DownloadOptions::default()
        };
        assert_eq!(opts.batch_options().retry.max_attempts, 1);
        assert_eq!(DownloadOptions::default().batch_options().concurrency, 4);
    }

    #[tokio::test]
    async fn download_with_fetches_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(
            dir.path(),
            "- url: https://example.org/data.tsv.gz\n  local_name: data.tsv.gz\n",
        );
        let out = dir.path().join("data");
        let report = download_with(Arc::new(Fixed), &manifest, &out, &DownloadOptions::default())
            .await
            .unwrap();
        assert!(report.is_success());
        assert!(std::fs::metadata(out.join("data.tsv.gz")).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn missing_manifest_is_batch_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = download_with(
            Arc::new(Fixed),
            &dir.path().join("nope.yaml"),
            dir.path(),
            &DownloadOptions::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LocalIo);
    }

    #[tokio::test]
    async fn temp_name_clash_refuses_batch_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(
            dir.path(),
            "- url: http://example.org/a.gz\n\
             - url: http://example.org/b.bin\n  local_name: a.gz.part\n",
        );
        let err = download_with(Arc::new(Fixed), &manifest, dir.path(), &DownloadOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameCollision);
        assert!(!dir.path().join("a.gz").exists());
        assert!(!dir.path().join("a.gz.part").exists());
    }

    #[test]
    fn plan_reports_cached_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(
            dir.path(),
            "- url: http://example.org/have.tsv\n- url: http://example.org/need.tsv\n",
        );
        std::fs::write(dir.path().join("have.tsv"), b"x").unwrap();

        let planned = plan(&manifest, dir.path(), false).unwrap();
        let flags: Vec<_> = planned.iter().map(|p| p.will_fetch).collect();
        assert_eq!(flags, vec![false, true]);

        let forced = plan(&manifest, dir.path(), true).unwrap();
        assert!(forced.iter().all(|p| p.will_fetch));
    }

    #[test]
    fn relative_output_dir_becomes_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), "- url: http://example.org/a.tsv\n");
        let planned = plan(&manifest, Path::new("cache"), false).unwrap();
        assert!(planned[0].target.absolute_path().is_absolute());
        assert!(planned[0].target.absolute_path().ends_with("cache/a.tsv"));
    }

    #[test]
    fn empty_output_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), "- url: http://example.org/a.tsv\n");
        let err = plan(&manifest, Path::new(""), false).unwrap_err();
        assert!(matches!(err, DownloadError::OutputDir { .. }));
    }
}
