//! Protocol fetcher: streams a remote resource onto local disk.
//!
//! Each scheme has its own transport on top of libcurl (`HttpTransport` for
//! http/https, `FtpTransport` for ftp). They share one streaming-write path
//! into a `.part` file; `fetch_to_path` publishes the file under its final
//! name only after the whole body arrived.

mod easy;
mod ftp;
mod http;

pub use ftp::FtpTransport;
pub use http::HttpTransport;

use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::control::CancelToken;
use crate::error::FetchError;
use crate::storage::{self, PartFile};
use crate::url_model::Scheme;

/// Default `User-Agent` for HTTP requests.
pub const DEFAULT_USER_AGENT: &str = concat!("dsfetch/", env!("CARGO_PKG_VERSION"));

/// libcurl tuning shared by all transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    pub connect_timeout: Duration,
    /// Abort when throughput stays below this many bytes/sec ...
    pub low_speed_limit: u32,
    /// ... for this long.
    pub low_speed_time: Duration,
    /// Hard wall-clock cap per attempt (None = no cap).
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Streams the body of `url` into `out`, returning the number of bytes written.
///
/// Implementations must report a refused/failed connection or a broken
/// transfer as `Transport`, an explicit server rejection as `Remote`, and
/// return `Cancelled` promptly once `cancel` is set.
pub trait Transport: Send + Sync {
    fn stream(&self, url: &Url, out: &mut PartFile, cancel: &CancelToken) -> Result<u64, FetchError>;
}

/// Dispatches to the transport registered for each scheme.
pub struct ProtocolFetcher {
    http: HttpTransport,
    ftp: FtpTransport,
}

impl ProtocolFetcher {
    pub fn new(opts: TransferOptions) -> Self {
        Self {
            http: HttpTransport::new(opts.clone()),
            ftp: FtpTransport::new(opts),
        }
    }

    pub fn transport_for(&self, scheme: Scheme) -> &dyn Transport {
        match scheme {
            Scheme::Http | Scheme::Https => &self.http,
            Scheme::Ftp => &self.ftp,
        }
    }

    /// Fetch `url` to `destination` (see [`fetch_to_path`]).
    pub fn fetch(&self, url: &Url, destination: &Path, cancel: &CancelToken) -> Result<u64, FetchError> {
        fetch_to_path(self, url, destination, cancel)
    }
}

impl Default for ProtocolFetcher {
    fn default() -> Self {
        Self::new(TransferOptions::default())
    }
}

impl Transport for ProtocolFetcher {
    fn stream(&self, url: &Url, out: &mut PartFile, cancel: &CancelToken) -> Result<u64, FetchError> {
        let scheme = Scheme::of(url).ok_or_else(|| FetchError::Remote {
            code: None,
            cause: format!("unsupported scheme {:?}", url.scheme()),
        })?;
        self.transport_for(scheme).stream(url, out, cancel)
    }
}

/// Download `url` to `destination` through `transport`.
///
/// Creates the destination directory if needed, streams into
/// `<destination>.part`, then fsyncs and renames. On any error the `.part`
/// file is removed and `destination` is left untouched.
pub fn fetch_to_path(
    transport: &dyn Transport,
    url: &Url,
    destination: &Path,
    cancel: &CancelToken,
) -> Result<u64, FetchError> {
    if cancel.is_cancelled() {
        return Err(FetchError::Cancelled);
    }
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| FetchError::local_io(format!("create directory {}", parent.display()), e))?;
    }
    let mut part = PartFile::create(destination).map_err(|e| {
        FetchError::local_io(
            format!("create {}", storage::temp_path(destination).display()),
            e,
        )
    })?;

    transport.stream(url, &mut part, cancel)?;

    let written = part
        .publish()
        .map_err(|e| FetchError::local_io(format!("publish {}", destination.display()), e))?;
    tracing::debug!(url = %url, path = %destination.display(), bytes = written, "published");
    Ok(written)
}
