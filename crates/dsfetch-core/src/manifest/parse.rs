//! Manifest text → ordered `DownloadEntry` list.

use serde_yaml::{Mapping, Value};
use std::path::Path;
use url::Url;

use super::DownloadEntry;
use crate::error::DownloadError;
use crate::url_model::{self, Scheme};

/// Read and parse the manifest at `path`.
pub fn parse_file(path: &Path) -> Result<Vec<DownloadEntry>, DownloadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DownloadError::ManifestUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw)
}

/// Parse manifest text into entries, preserving manifest order.
///
/// Fails with `MalformedManifest` when the top level is not a sequence of
/// mappings, or an entry lacks a usable `url` or `local_name`. The reason
/// names the offending entry (1-based).
pub fn parse(raw: &str) -> Result<Vec<DownloadEntry>, DownloadError> {
    if is_blank(raw) {
        return Ok(Vec::new());
    }
    let doc: Value = serde_yaml::from_str(raw)
        .map_err(|e| DownloadError::malformed(format!("invalid YAML: {}", e)))?;

    let items = match doc {
        Value::Sequence(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(DownloadError::malformed(format!(
                "expected a sequence of entries at the top level, found {}",
                type_name(&other)
            )))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_entry(i + 1, item))
        .collect()
}

fn parse_entry(n: usize, item: &Value) -> Result<DownloadEntry, DownloadError> {
    let map = match item {
        Value::Mapping(m) => m,
        other => {
            return Err(DownloadError::malformed(format!(
                "entry {}: expected a mapping with a `url` key, found {}",
                n,
                type_name(other)
            )))
        }
    };

    let url = parse_url(n, map)?;
    let local_name = match map.get("local_name") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            url_model::check_local_name(s).map_err(|why| {
                DownloadError::malformed(format!("entry {}: `local_name` {:?} {}", n, s, why))
            })?;
            Some(s.clone())
        }
        Some(other) => {
            return Err(DownloadError::malformed(format!(
                "entry {}: `local_name` must be a string, found {}",
                n,
                type_name(other)
            )))
        }
    };
    let comment = match map.get("comment") {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };

    let entry = DownloadEntry {
        url,
        local_name,
        comment,
    };
    if entry.file_name().is_none() {
        return Err(DownloadError::malformed(format!(
            "entry {}: cannot derive a file name from {}; set `local_name`",
            n, entry.url
        )));
    }
    Ok(entry)
}

fn parse_url(n: usize, map: &Mapping) -> Result<Url, DownloadError> {
    let raw = match map.get("url") {
        None | Some(Value::Null) => {
            return Err(DownloadError::malformed(format!("entry {}: missing `url`", n)))
        }
        Some(Value::String(s)) => s.trim(),
        Some(other) => {
            return Err(DownloadError::malformed(format!(
                "entry {}: `url` must be a string, found {}",
                n,
                type_name(other)
            )))
        }
    };
    if raw.is_empty() {
        return Err(DownloadError::malformed(format!("entry {}: `url` is empty", n)));
    }
    let url = Url::parse(raw).map_err(|e| {
        DownloadError::malformed(format!("entry {}: `url` {:?} is not a valid URL: {}", n, raw, e))
    })?;
    if Scheme::of(&url).is_none() {
        return Err(DownloadError::malformed(format!(
            "entry {}: unsupported scheme {:?} (expected http, https or ftp)",
            n,
            url.scheme()
        )));
    }
    Ok(url)
}

/// True when the document has no content besides comments and separators.
fn is_blank(raw: &str) -> bool {
    raw.lines().all(|line| {
        let t = line.trim();
        t.is_empty() || t.starts_with('#') || t == "---" || t == "..."
    })
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
