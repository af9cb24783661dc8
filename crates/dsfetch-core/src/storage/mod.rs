//! Disk I/O and file lifecycle.
//!
//! Every transfer is written to a `.part` sibling of its destination and
//! renamed onto the final name only after the body is complete and synced,
//! so a file at the final name is always a finished download.

mod writer;

pub use writer::PartFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `data.tsv.gz` → `data.tsv.gz.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}
