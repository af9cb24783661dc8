pub mod config;
pub mod logging;

pub mod batch;
pub mod cache_gate;
pub mod control;
pub mod download;
pub mod downloader;
pub mod error;
pub mod manifest;
pub mod resolver;
pub mod retry;
pub mod storage;
pub mod url_model;

pub use batch::{BatchReport, BatchSummary, FetchResult, FetchStatus};
pub use control::CancelToken;
pub use download::{download, download_with, plan, DownloadOptions, PlannedTarget};
pub use error::{DownloadError, ErrorKind, FetchError};
