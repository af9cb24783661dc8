//! Batch runner: fetch every resolved target with partial-failure isolation.
//!
//! Keeps up to `concurrency` fetches in flight on blocking worker threads.
//! Each target is gated, fetched with retry, and its outcome written to the
//! slot matching its manifest position. A failed entry never stops the
//! others; the report decides overall success.

mod result;

pub use result::{BatchReport, BatchSummary, FetchResult, FetchStatus};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::cache_gate::CacheGate;
use crate::control::CancelToken;
use crate::downloader::{fetch_to_path, Transport};
use crate::error::ErrorKind;
use crate::resolver::ResolvedTarget;
use crate::retry::{run_with_retry, RetryPolicy};

/// Default number of concurrent fetches.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Per-run knobs.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Refetch even when a cached file is present.
    pub force: bool,
    /// Maximum fetches in flight (0 is treated as 1).
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            force: false,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

/// Runs batches of fetches through one shared transport.
pub struct BatchRunner {
    transport: Arc<dyn Transport>,
}

impl BatchRunner {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch all `targets`, returning one result per target in input order.
    ///
    /// Once `cancel` is set no further fetches start; running ones abort and
    /// targets that never started are reported failed with `Cancelled`.
    pub async fn run(
        &self,
        targets: &[ResolvedTarget],
        opts: &BatchOptions,
        cancel: &CancelToken,
    ) -> BatchReport {
        let total = targets.len();
        let max_concurrent = opts.concurrency.max(1);
        let gate = CacheGate::new(opts.force);
        let mut slots: Vec<Option<FetchResult>> = vec![None; total];
        let mut pending = targets.iter().enumerate();
        let mut join_set = tokio::task::JoinSet::new();

        tracing::info!(
            total,
            concurrency = max_concurrent,
            force = opts.force,
            "starting batch"
        );

        loop {
            while join_set.len() < max_concurrent && !cancel.is_cancelled() {
                let Some((slot, target)) = pending.next() else {
                    break;
                };
                let target = target.clone();
                let transport = Arc::clone(&self.transport);
                let policy = opts.retry;
                let cancel = cancel.clone();
                join_set.spawn_blocking(move || {
                    let position = Position { slot, total };
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        process_target(transport.as_ref(), &target, gate, &policy, &cancel, position)
                    }))
                    .unwrap_or_else(|payload| worker_panicked(&target, position, payload));
                    (slot, result)
                });
            }

            let Some(joined) = join_set.join_next().await else {
                break;
            };
            match joined {
                Ok((slot, result)) => slots[slot] = Some(result),
                Err(e) => tracing::error!("fetch worker did not complete: {}", e),
            }
        }

        let results = slots
            .into_iter()
            .zip(targets)
            .map(|(slot, target)| slot.unwrap_or_else(|| not_completed(target, cancel)))
            .collect();
        let report = BatchReport { results };
        let s = report.summary();
        tracing::info!(
            downloaded = s.downloaded,
            skipped = s.skipped,
            failed = s.failed,
            bytes = s.bytes_written,
            "batch finished"
        );
        report
    }
}

/// 1-based progress position for log lines.
#[derive(Debug, Clone, Copy)]
struct Position {
    slot: usize,
    total: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}]", self.slot + 1, self.total)
    }
}

fn process_target(
    transport: &dyn Transport,
    target: &ResolvedTarget,
    gate: CacheGate,
    policy: &RetryPolicy,
    cancel: &CancelToken,
    position: Position,
) -> FetchResult {
    if cancel.is_cancelled() {
        return not_completed(target, cancel);
    }
    let dest = target.absolute_path();
    if !gate.should_fetch(target) {
        tracing::info!("{} cached {}", position, dest.display());
        return FetchResult::new(target, 0, FetchStatus::SkippedCached);
    }

    tracing::debug!("{} fetching {} -> {}", position, target.url(), dest.display());
    let mut attempts = 0u32;
    let outcome = run_with_retry(policy, cancel, || {
        attempts += 1;
        fetch_to_path(transport, target.url(), dest, cancel)
    });

    let status = match outcome {
        Ok(bytes_written) => {
            tracing::info!(
                "{} downloaded {} ({} bytes)",
                position,
                dest.display(),
                bytes_written
            );
            FetchStatus::Downloaded { bytes_written }
        }
        Err(e) => {
            tracing::warn!(
                attempts,
                "{} failed {}: {} ({})",
                position,
                target.url(),
                e,
                e.kind()
            );
            FetchStatus::Failed {
                kind: e.kind(),
                cause: e.to_string(),
            }
        }
    };
    FetchResult::new(target, attempts, status)
}

/// Result for a target whose worker never reported back.
fn not_completed(target: &ResolvedTarget, cancel: &CancelToken) -> FetchResult {
    let (kind, cause) = if cancel.is_cancelled() {
        (ErrorKind::Cancelled, "not attempted: batch cancelled")
    } else {
        (ErrorKind::Internal, "fetch worker stopped unexpectedly")
    };
    FetchResult::new(
        target,
        0,
        FetchStatus::Failed {
            kind,
            cause: cause.to_string(),
        },
    )
}

fn worker_panicked(
    target: &ResolvedTarget,
    position: Position,
    payload: Box<dyn Any + Send>,
) -> FetchResult {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!("{} fetch worker panicked on {}: {}", position, target.url(), message);
    FetchResult::new(
        target,
        0,
        FetchStatus::Failed {
            kind: ErrorKind::Internal,
            cause: format!("fetch worker panicked: {}", message),
        },
    )
}
