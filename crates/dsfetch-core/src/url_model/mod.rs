//! URL modeling and filename derivation.
//!
//! Decides which URLs the fetcher can serve and derives the cache file name
//! for entries that do not name one explicitly.

mod path;
mod sanitize;

pub use path::{filename_from_url_path, percent_decode};
pub use sanitize::sanitize_file_name;

use std::fmt;
use url::Url;

/// Transfer protocols the fetcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    Ftp,
}

impl Scheme {
    /// Scheme of `url`, or `None` if it is not one we can fetch.
    pub fn of(url: &Url) -> Option<Scheme> {
        match url.scheme() {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "ftp" => Some(Scheme::Ftp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ftp => "ftp",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives the cache file name for a URL: its last non-empty path segment,
/// percent-decoded and sanitized. `None` when the path has no usable segment
/// (e.g. `https://example.org/`).
///
/// - `derive_file_name("https://example.org/download/go-basic.obo")` → `"go-basic.obo"`
/// - `derive_file_name("ftp://ftp.example.org/pub/My%20Data.tsv")` → `"My Data.tsv"`
pub fn derive_file_name(url: &Url) -> Option<String> {
    let raw = filename_from_url_path(url)?;
    let name = sanitize_file_name(&raw);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

/// Checks an explicit `local_name`: it must be a single, non-empty path
/// component. Returns a reason when it is not.
pub fn check_local_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("is empty");
    }
    if name == "." || name == ".." {
        return Err("is not a file name");
    }
    if name.contains('/') || name.contains('\\') {
        return Err("contains a path separator");
    }
    if name.contains('\0') {
        return Err("contains NUL");
    }
    Ok(())
}
