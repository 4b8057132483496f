//! Per-file entry resolution.
//!
//! Turns one [`InputFile`] into zero or more [`Entry`] records:
//!
//! 1. Skip checks: directories, `404.html`/`404.htm` (any case), and — when
//!    `noindex` is enabled — pages whose contents carry a robots noindex
//!    meta tag. Skipped files produce no entries and do not count as
//!    observed input.
//! 2. Path normalization: separators become forward slashes, then a trailing
//!    `index.<ext>` segment collapses to the directory URL for each
//!    configured extension (`foo/index.html` → `foo/`, bare `index.html` →
//!    the site root).
//! 3. Override merge: the first mapping rule whose glob patterns match the
//!    path wins wholesale; fields it leaves unset fall through to the
//!    sitewide defaults, never to a later rule.
//! 4. Expand mode: if the normalized path is registered in `expand`, the
//!    associated JSON data file fans the file out into one entry per record.
//!    A read or parse failure is logged and yields zero entries for that
//!    file — the batch continues.
//!
//! Streaming (non-buffered) input is unsupported and fails the batch before
//! any entry is produced.

use crate::config::{ExpandSpec, SiteConfig};
use crate::types::{Entry, FileContents, InputFile, Lastmod};
use crate::urlset::{Namespace, UrlSet};
use chrono::Utc;
use log::warn;
use regex::Regex;
use std::fs;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("streaming not supported: {0}")]
    StreamingNotSupported(String),
}

/// Outcome of resolving one input file.
///
/// `Skipped` files never count as observed input; `Entries` may be empty
/// (expand mode with an unreadable data file) and still counts, so the
/// batch emits a document.
#[derive(Debug)]
pub enum Resolution {
    Skipped,
    Entries(Vec<Entry>),
}

static NOT_FOUND_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)404\.html?$").expect("valid regex"));
static NOINDEX_META: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<meta [^>]*?noindex").expect("valid regex"));

/// Resolve one input file into its sitemap entries.
///
/// Registers the image/video namespaces on the tracker when the matching
/// feature flags are enabled (idempotent, per entry).
pub fn resolve(
    file: &InputFile,
    config: &SiteConfig,
    urlset: &mut UrlSet,
) -> Result<Resolution, ResolveError> {
    if file.is_dir {
        return Ok(Resolution::Skipped);
    }
    if matches!(file.contents, FileContents::Stream) {
        return Err(ResolveError::StreamingNotSupported(file.relative.clone()));
    }
    if NOT_FOUND_PAGE.is_match(&file.relative) {
        return Ok(Resolution::Skipped);
    }
    if config.noindex
        && let FileContents::Buffered(bytes) = &file.contents
        && NOINDEX_META.is_match(&String::from_utf8_lossy(bytes))
    {
        return Ok(Resolution::Skipped);
    }

    let normalized = file.relative.replace('\\', "/");

    let entries = match config.expand.get(&normalized) {
        Some(spec) => expand_entries(file, &normalized, spec, config, urlset),
        None => vec![build_entry(file, &normalized, None, config, urlset)],
    };
    Ok(Resolution::Entries(entries))
}

/// Fan one file out into an entry per record of its JSON data file.
///
/// Any failure to read or parse the data file is logged and produces zero
/// entries; the file still counts as observed input.
fn expand_entries(
    file: &InputFile,
    normalized: &str,
    spec: &ExpandSpec,
    config: &SiteConfig,
    urlset: &mut UrlSet,
) -> Vec<Entry> {
    let records: Vec<serde_json::Value> = match fs::read(&spec.data_file)
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice(&bytes).map_err(|e| e.to_string()))
    {
        Ok(records) => records,
        Err(e) => {
            warn!(
                "error processing entry {}: {e}",
                spec.data_file.display()
            );
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(records.len());
    for record in &records {
        let extension = match record.get(&spec.key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => {
                warn!(
                    "expand record in {} has no value for key {:?}",
                    spec.data_file.display(),
                    spec.key
                );
                continue;
            }
            Some(other) => other.to_string(),
        };
        entries.push(build_entry(file, normalized, Some(&extension), config, urlset));
    }
    entries
}

/// Build one entry from a normalized path, merging the first matching
/// mapping rule over the sitewide defaults.
fn build_entry(
    file: &InputFile,
    normalized: &str,
    url_extension: Option<&str>,
    config: &SiteConfig,
    urlset: &mut UrlSet,
) -> Entry {
    if config.images {
        urlset.add(Namespace::Image);
    }
    if config.videos {
        urlset.add(Namespace::Video);
    }

    let rule = config.mapping_for(normalized);

    let changefreq = rule
        .and_then(|r| r.changefreq.clone())
        .or_else(|| config.changefreq.clone());
    let priority = rule
        .and_then(|r| r.priority.clone())
        .or_else(|| config.priority.clone());
    let get_loc = rule
        .and_then(|r| r.get_loc.clone())
        .or_else(|| config.get_loc.clone());
    let hreflang = rule
        .and_then(|r| r.hreflang.clone())
        .unwrap_or_else(|| config.hreflang.clone());
    let lastmod_policy = rule
        .and_then(|r| r.lastmod.clone())
        .unwrap_or_else(|| config.lastmod.clone());

    let lastmod = match lastmod_policy {
        Lastmod::Auto => Some(file.mtime.unwrap_or_else(Utc::now)),
        Lastmod::Omit => None,
        Lastmod::At(ts) => Some(ts),
        Lastmod::Computed(f) => Some(f(file)),
    };

    let mut path = collapse_index(normalized, &config.index_replace);
    if let Some(extension) = url_extension {
        path = swap_extension(&path, extension);
    }

    Entry {
        loc: format!("{}{}", config.site_url, path),
        file: path,
        source: file.source.clone(),
        lastmod,
        changefreq,
        priority,
        get_loc,
        hreflang,
    }
}

/// Remove a trailing `index.<ext>` segment for each configured extension.
///
/// `foo/index.html` → `foo/`, bare `index.html` → empty string (site root).
/// A name merely ending in the segment (`fooindex.html`) is left alone.
fn collapse_index(path: &str, extensions: &[String]) -> String {
    let mut path = path.to_string();
    for ext in extensions {
        let segment = format!("index.{ext}");
        if path == segment {
            path = String::new();
        } else if let Some(parent) = path.strip_suffix(&format!("/{segment}")) {
            path = format!("{parent}/");
        }
    }
    path
}

/// Replace the final extension with `/<value>` for expand mode.
///
/// `fixtures/videos.php` + `lorem` → `fixtures/videos/lorem`, and an
/// index-collapsed `fixtures/videos/` + `lorem` → `fixtures/videos/lorem`.
fn swap_extension(path: &str, value: &str) -> String {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    let base = match path[segment_start..].rfind('.') {
        Some(dot) => &path[..segment_start + dot],
        None => path.trim_end_matches('/'),
    };
    if base.is_empty() {
        value.to_string()
    } else {
        format!("{base}/{value}")
    }
}
