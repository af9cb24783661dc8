//! Cache gate: decides whether a target still needs fetching.
//!
//! Validity is read from the filesystem on every run; there is no ledger.
//! A target counts as cached when a regular, non-empty file sits at its
//! path. The manifest carries no checksums, so a corrupted file of non-zero
//! size is still treated as cached; pass `force` to refetch regardless.
//! Partial transfers never reach the final name (see `storage`), so the
//! check is not fooled by an interrupted download.

use std::path::Path;

use crate::resolver::ResolvedTarget;

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheGate {
    force: bool,
}

impl CacheGate {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn force(&self) -> bool {
        self.force
    }

    /// True when `target` must be fetched this run.
    pub fn should_fetch(&self, target: &ResolvedTarget) -> bool {
        self.force || !is_satisfied(target.absolute_path())
    }
}

/// Regular file with size > 0 at `path`.
pub fn is_satisfied(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}
