//! Target resolution: pair each manifest entry with its cache path.
//!
//! The cache directory is flat, so two entries that resolve to the same
//! file name would silently overwrite each other. The same holds when one
//! entry's name is another entry's `.part` temp name. Resolution refuses
//! such a batch up front and reports every collision at once.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{Collision, DownloadError};
use crate::manifest::DownloadEntry;
use crate::storage;

/// A manifest entry paired with its destination. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    index: usize,
    url: Url,
    file_name: String,
    absolute_path: PathBuf,
}

impl ResolvedTarget {
    /// Position of the owning entry in the manifest (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }
}

/// Resolve every entry against `output_dir`, in manifest order.
///
/// Fails with `NameCollision` listing all groups of entries that share a
/// destination. Entries whose name cannot be determined are rejected as
/// `MalformedManifest` (the parser normally catches these first).
pub fn resolve(
    entries: &[DownloadEntry],
    output_dir: &Path,
) -> Result<Vec<ResolvedTarget>, DownloadError> {
    let mut targets = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let file_name = entry.file_name().ok_or_else(|| {
            DownloadError::malformed(format!(
                "entry {}: cannot derive a file name from {}",
                index + 1,
                entry.url
            ))
        })?;
        targets.push(ResolvedTarget {
            index,
            url: entry.url.clone(),
            absolute_path: output_dir.join(&file_name),
            file_name,
        });
    }

    let collisions = find_collisions(&targets);
    if !collisions.is_empty() {
        return Err(DownloadError::NameCollision { collisions });
    }
    Ok(targets)
}

/// Group targets whose files would overlap. Each target owns its final path
/// and its `.part` sibling, so a final name equal to another target's temp
/// name is a clash too.
fn find_collisions(targets: &[ResolvedTarget]) -> Vec<Collision> {
    let mut by_path: BTreeMap<PathBuf, Vec<&ResolvedTarget>> = BTreeMap::new();
    for t in targets {
        by_path.entry(t.absolute_path.clone()).or_default().push(t);
    }
    for t in targets {
        if let Some(group) = by_path.get_mut(&storage::temp_path(&t.absolute_path)) {
            if group.iter().all(|other| other.index != t.index) {
                group.push(t);
            }
        }
    }
    by_path
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(path, mut group)| {
            group.sort_by_key(|t| t.index);
            Collision {
                path,
                entries: group
                    .iter()
                    .map(|t| (t.index + 1, t.url.to_string()))
                    .collect(),
            }
        })
        .collect()
}
