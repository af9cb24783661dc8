//! CLI command handlers, one file per command.

mod completions;
mod download;
mod plan;

pub use completions::run_completions;
pub use download::{run_download, DownloadRequest};
pub use plan::run_plan;
