//! Download manifest: the declarative list of datasets to fetch.
//!
//! A manifest is a YAML sequence of entry mappings:
//!
//! ```yaml
//! ---
//! #
//! # DrugCentral drug-target interactions
//! #
//! -
//!   url: http://unmtid-shinyapps.net/download/drug.target.interaction.tsv.gz
//!   local_name: drug.target.interaction.tsv.gz
//! -
//!   url: ftp://ftp.ebi.ac.uk/pub/databases/intact/current/psimitab/intact.zip
//! ```
//!
//! Only `url` is required. `local_name` overrides the file name derived from
//! the URL; `comment` is informational; other keys are ignored.

mod parse;

pub use parse::{parse, parse_file};

use url::Url;

use crate::url_model;

/// One manifest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    /// Source URL; scheme is http, https or ftp.
    pub url: Url,
    /// Explicit cache file name, if the manifest gave one.
    pub local_name: Option<String>,
    /// Free-form note; never affects behavior.
    pub comment: Option<String>,
}

impl DownloadEntry {
    /// Cache file name: `local_name` if set, else derived from the URL path.
    pub fn file_name(&self) -> Option<String> {
        self.local_name
            .clone()
            .or_else(|| url_model::derive_file_name(&self.url))
    }
}
