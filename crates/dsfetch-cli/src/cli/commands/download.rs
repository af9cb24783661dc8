//! `dsfetch download` – fetch every manifest entry into the cache directory.

use anyhow::{bail, Context, Result};
use dsfetch_core::config::DsfetchConfig;
use dsfetch_core::{BatchReport, DownloadOptions, FetchStatus};
use std::path::PathBuf;

/// Arguments of one `download` invocation. `None` means "use the config".
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub manifest: PathBuf,
    pub output_dir: PathBuf,
    pub force: bool,
    pub jobs: Option<usize>,
    pub retries: Option<u32>,
    pub report: Option<PathBuf>,
}

impl DownloadRequest {
    /// Merge CLI flags over config values.
    pub fn options(&self, cfg: &DsfetchConfig) -> DownloadOptions {
        let retry = cfg.retry_policy();
        DownloadOptions {
            force: self.force,
            concurrency: self.jobs.unwrap_or(cfg.concurrency).max(1),
            retries: self.retries.unwrap_or(retry.max_attempts).max(1),
            retry_base_delay: retry.base_delay,
            retry_max_delay: retry.max_delay,
            transfer: cfg.transfer_options(),
            ..DownloadOptions::default()
        }
    }
}

pub async fn run_download(cfg: &DsfetchConfig, req: &DownloadRequest) -> Result<()> {
    let opts = req.options(cfg);

    let cancel = opts.cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted; aborting transfers in flight.");
            cancel.cancel();
        }
    });

    let outcome = dsfetch_core::download(&req.manifest, &req.output_dir, &opts).await;
    interrupt.abort();
    let report = outcome?;

    print_report(&report);
    if let Some(path) = &req.report {
        write_json_report(&report, path)?;
    }

    let s = report.summary();
    if s.failed > 0 {
        bail!("{} of {} entries failed", s.failed, report.results.len());
    }
    Ok(())
}

fn print_report(report: &BatchReport) {
    for r in &report.results {
        match &r.status {
            FetchStatus::Downloaded { bytes_written } => println!(
                "downloaded  {} ({} bytes)",
                r.destination.display(),
                bytes_written
            ),
            FetchStatus::SkippedCached => println!("cached      {}", r.destination.display()),
            FetchStatus::Failed { kind, cause } => {
                println!("FAILED      {} [{}] {}", r.url, kind, cause)
            }
        }
    }
    let s = report.summary();
    println!(
        "{} downloaded, {} cached, {} failed ({} bytes written)",
        s.downloaded, s.skipped, s.failed, s.bytes_written
    );
}

fn write_json_report(report: &BatchReport, path: &std::path::Path) -> Result<()> {
    let doc = serde_json::json!({
        "summary": report.summary(),
        "results": report.results,
    });
    let text = serde_json::to_string_pretty(&doc)?;
    std::fs::write(path, text).with_context(|| format!("writing report {}", path.display()))?;
    tracing::info!("wrote report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsfetch_core::config::RetryConfig;
    use std::time::Duration;

    fn request() -> DownloadRequest {
        DownloadRequest {
            manifest: PathBuf::from("download.yaml"),
            output_dir: PathBuf::from("data/raw"),
            force: false,
            jobs: None,
            retries: None,
            report: None,
        }
    }

    #[test]
    fn config_supplies_defaults() {
        let cfg = DsfetchConfig {
            concurrency: 6,
            retry: Some(RetryConfig {
                max_attempts: 5,
                base_delay_secs: 1.0,
                max_delay_secs: 4,
            }),
            transfer: None,
        };
        let opts = request().options(&cfg);
        assert_eq!(opts.concurrency, 6);
        assert_eq!(opts.retries, 5);
        assert_eq!(opts.retry_base_delay, Duration::from_secs(1));
        assert_eq!(opts.retry_max_delay, Duration::from_secs(4));
    }

    #[test]
    fn flags_override_config() {
        let mut req = request();
        req.jobs = Some(2);
        req.retries = Some(0);
        req.force = true;
        let opts = req.options(&DsfetchConfig::default());
        assert_eq!(opts.concurrency, 2);
        assert_eq!(opts.retries, 1);
        assert!(opts.force);
    }
}
