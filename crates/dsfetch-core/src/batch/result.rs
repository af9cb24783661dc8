//! Per-entry outcomes and the run report.

use serde::Serialize;
use std::path::PathBuf;

use crate::error::ErrorKind;
use crate::resolver::ResolvedTarget;

/// What happened to one target during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum FetchStatus {
    /// A valid file was already present; nothing was transferred.
    SkippedCached,
    Downloaded { bytes_written: u64 },
    Failed { kind: ErrorKind, cause: String },
}

impl FetchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FetchStatus::SkippedCached => "skipped-cached",
            FetchStatus::Downloaded { .. } => "downloaded",
            FetchStatus::Failed { .. } => "failed",
        }
    }
}

/// Outcome for one target, with enough context to retry just the failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchResult {
    /// Position of the entry in the manifest (0-based).
    pub index: usize,
    pub url: String,
    pub destination: PathBuf,
    /// Fetch attempts made (0 when skipped or never started).
    pub attempts: u32,
    #[serde(flatten)]
    pub status: FetchStatus,
}

impl FetchResult {
    pub(crate) fn new(target: &ResolvedTarget, attempts: u32, status: FetchStatus) -> Self {
        Self {
            index: target.index(),
            url: target.url().to_string(),
            destination: target.absolute_path().to_path_buf(),
            attempts,
            status,
        }
    }

    /// Bytes written this run; 0 unless downloaded.
    pub fn bytes_written(&self) -> u64 {
        match self.status {
            FetchStatus::Downloaded { bytes_written } => bytes_written,
            _ => 0,
        }
    }

    /// Error kind and cause, present iff the fetch failed.
    pub fn error(&self) -> Option<(ErrorKind, &str)> {
        match &self.status {
            FetchStatus::Failed { kind, cause } => Some((*kind, cause.as_str())),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, FetchStatus::Failed { .. })
    }
}

/// Counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub skipped: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub bytes_written: u64,
}

/// All results of a run, in manifest order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub results: Vec<FetchResult>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let mut s = BatchSummary::default();
        for r in &self.results {
            match r.status {
                FetchStatus::SkippedCached => s.skipped += 1,
                FetchStatus::Downloaded { bytes_written } => {
                    s.downloaded += 1;
                    s.bytes_written += bytes_written;
                }
                FetchStatus::Failed { .. } => s.failed += 1,
            }
        }
        s
    }

    /// True iff no entry failed.
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(FetchResult::is_failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchResult> {
        self.results.iter().filter(|r| r.is_failed())
    }
}
