//! Error taxonomy for a batch run.
//!
//! Two layers: [`DownloadError`] is batch-fatal and stops the run before any
//! fetch begins; [`FetchError`] is scoped to one entry and ends up in that
//! entry's result without touching the rest of the batch.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Category of a failure, shared by batch-fatal and per-entry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Manifest is structurally invalid.
    MalformedManifest,
    /// Two entries resolve to the same local path.
    NameCollision,
    /// Connection, timeout or interrupted transfer. Retried.
    Transport,
    /// Server explicitly rejected the request (HTTP status, FTP reply).
    Remote,
    /// Local filesystem problem (permissions, disk full, rename).
    LocalIo,
    /// Stopped by the caller before completing.
    Cancelled,
    /// The fetch worker itself failed (panicked).
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedManifest => "malformed-manifest",
            ErrorKind::NameCollision => "name-collision",
            ErrorKind::Transport => "transport",
            ErrorKind::Remote => "remote",
            ErrorKind::LocalIo => "local-io",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One group of entries that resolved to the same destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub path: PathBuf,
    /// `(1-based entry number, url)` for every entry sharing `path`.
    pub entries: Vec<(usize, String)>,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- ", self.path.display())?;
        for (i, (n, url)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "entry {} ({})", n, url)?;
        }
        Ok(())
    }
}

fn join_collisions(collisions: &[Collision]) -> String {
    collisions
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Batch-fatal error: nothing is fetched when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("malformed manifest: {reason}")]
    MalformedManifest { reason: String },

    #[error("name collision: {}", join_collisions(.collisions))]
    NameCollision { collisions: Vec<Collision> },

    #[error("cannot read manifest {}: {source}", .path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot use output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        DownloadError::MalformedManifest {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::MalformedManifest { .. } => ErrorKind::MalformedManifest,
            DownloadError::NameCollision { .. } => ErrorKind::NameCollision,
            DownloadError::ManifestUnreadable { .. } | DownloadError::OutputDir { .. } => {
                ErrorKind::LocalIo
            }
        }
    }
}

/// Error from a single fetch attempt. Classified so the retry policy can
/// decide whether another attempt is worthwhile.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, reset or short body.
    #[error("{cause}")]
    Transport { cause: String },

    /// Non-success HTTP status or negative FTP reply.
    #[error("{}", remote_message(.code, .cause))]
    Remote { code: Option<u32>, cause: String },

    #[error("{context}: {source}")]
    LocalIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cancelled")]
    Cancelled,
}

fn remote_message(code: &Option<u32>, cause: &str) -> String {
    match code {
        Some(code) => format!("remote rejected request ({}): {}", code, cause),
        None => format!("remote rejected request: {}", cause),
    }
}

impl FetchError {
    pub fn transport(cause: impl Into<String>) -> Self {
        FetchError::Transport {
            cause: cause.into(),
        }
    }

    pub fn local_io(context: impl Into<String>, source: std::io::Error) -> Self {
        FetchError::LocalIo {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport { .. } => ErrorKind::Transport,
            FetchError::Remote { .. } => ErrorKind::Remote,
            FetchError::LocalIo { .. } => ErrorKind::LocalIo,
            FetchError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_from_variants() {
        assert_eq!(FetchError::transport("reset").kind(), ErrorKind::Transport);
        assert_eq!(
            FetchError::Remote {
                code: Some(404),
                cause: "not found".into()
            }
            .kind(),
            ErrorKind::Remote
        );
        assert_eq!(FetchError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            DownloadError::malformed("x").kind(),
            ErrorKind::MalformedManifest
        );
    }

    #[test]
    fn remote_message_includes_code() {
        let e = FetchError::Remote {
            code: Some(550),
            cause: "no such file".into(),
        };
        assert_eq!(e.to_string(), "remote rejected request (550): no such file");
    }

    #[test]
    fn collision_message_names_every_entry() {
        let e = DownloadError::NameCollision {
            collisions: vec![Collision {
                path: PathBuf::from("/cache/a.gz"),
                entries: vec![
                    (1, "http://x/a.gz".into()),
                    (4, "ftp://y/a.gz".into()),
                ],
            }],
        };
        let msg = e.to_string();
        assert!(msg.contains("entry 1 (http://x/a.gz)"));
        assert!(msg.contains("entry 4 (ftp://y/a.gz)"));
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let s = serde_json::to_string(&ErrorKind::LocalIo).unwrap();
        assert_eq!(s, "\"local-io\"");
        assert_eq!(ErrorKind::Internal.as_str(), "internal");
    }
}
