//! Shared types used across the pipeline.
//!
//! Input files flow in from the hosting build tool, the resolver turns them
//! into [`Entry`] records, and the assembler turns the entry collection into
//! a single [`OutputFile`]. Configuration values that can be either a plain
//! value or a callback ([`Priority`], [`Lastmod`], [`Href`]) are tagged
//! unions rather than runtime type inspection.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Callback computing the final `<loc>` value: `(site_url, loc, entry)`.
pub type LocFn = Arc<dyn Fn(&str, &str, &Entry) -> String + Send + Sync>;

/// Callback computing a per-entry priority: `(site_url, loc, entry)`.
pub type PriorityFn = Arc<dyn Fn(&str, &str, &Entry) -> f64 + Send + Sync>;

/// Callback computing a per-file modification timestamp.
pub type LastmodFn = Arc<dyn Fn(&InputFile) -> DateTime<Utc> + Send + Sync>;

/// Callback computing an alternate-language href: `(site_url, file, lang, loc)`.
pub type HrefFn = Arc<dyn Fn(&str, &str, &str, &str) -> String + Send + Sync>;

/// Contents of an input file as handed over by the build pipeline.
///
/// Files with no buffered contents are processed normally (contents are only
/// consulted for the noindex check). Live byte streams are not supported and
/// make the whole batch fail.
#[derive(Debug, Clone, Default)]
pub enum FileContents {
    #[default]
    Empty,
    Buffered(Vec<u8>),
    Stream,
}

/// One file record from the hosting build pipeline.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Path relative to the site root. May contain backslash separators;
    /// they are normalized before any matching or URL construction.
    pub relative: String,
    /// Original (absolute) source path, used for image scraping.
    pub source: PathBuf,
    pub contents: FileContents,
    /// Filesystem modification time, if known.
    pub mtime: Option<DateTime<Utc>>,
    pub is_dir: bool,
}

impl InputFile {
    /// A regular buffered file with the given relative path and contents.
    pub fn new(relative: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        let relative = relative.into();
        Self {
            source: PathBuf::from(&relative),
            relative,
            contents: FileContents::Buffered(contents.into()),
            mtime: None,
            is_dir: false,
        }
    }
}

/// Sitemap priority: a fixed value or a callback invoked at render time.
///
/// `Fixed(0.0)` is a real value and renders as `<priority>0</priority>` —
/// it is never conflated with "no priority set".
#[derive(Clone)]
pub enum Priority {
    Fixed(f64),
    Computed(PriorityFn),
}

impl Priority {
    pub fn resolve(&self, site_url: &str, loc: &str, entry: &Entry) -> f64 {
        match self {
            Priority::Fixed(value) => *value,
            Priority::Computed(f) => f(site_url, loc, entry),
        }
    }
}

impl fmt::Debug for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Fixed(value) => write!(f, "Fixed({value})"),
            Priority::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// Last-modification policy for an entry.
///
/// - `Auto`: use the file's mtime, falling back to the current time
/// - `Omit`: explicit opt-out — no `<lastmod>` tag at all
/// - `At`: a fixed timestamp
/// - `Computed`: callback receiving the input file
#[derive(Clone, Default)]
pub enum Lastmod {
    #[default]
    Auto,
    Omit,
    At(DateTime<Utc>),
    Computed(LastmodFn),
}

impl fmt::Debug for Lastmod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lastmod::Auto => write!(f, "Auto"),
            Lastmod::Omit => write!(f, "Omit"),
            Lastmod::At(ts) => write!(f, "At({ts})"),
            Lastmod::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// Alternate-language href: a placeholder template or a callback.
///
/// Templates substitute `{siteUrl}`, `{file}`, `{lang}` and `{loc}`, which
/// covers the common config-file cases; callbacks are for library users.
#[derive(Clone)]
pub enum Href {
    Template(String),
    Computed(HrefFn),
}

impl Href {
    pub fn resolve(&self, site_url: &str, file: &str, lang: &str, loc: &str) -> String {
        match self {
            Href::Template(template) => template
                .replace("{siteUrl}", site_url)
                .replace("{file}", file)
                .replace("{lang}", lang)
                .replace("{loc}", loc),
            Href::Computed(f) => f(site_url, file, lang, loc),
        }
    }
}

impl fmt::Debug for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Href::Template(template) => write!(f, "Template({template:?})"),
            Href::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// One alternate-language link descriptor, rendered as an `xhtml:link`.
#[derive(Debug, Clone)]
pub struct HreflangLink {
    pub lang: String,
    pub href: Href,
}

/// One row of the eventual sitemap.
#[derive(Clone)]
pub struct Entry {
    /// Absolute URL; always starts with the configured site URL.
    pub loc: String,
    /// Normalized relative path, passed to hreflang callbacks.
    pub file: String,
    /// Original source path, read back when image scraping is enabled.
    pub source: PathBuf,
    pub lastmod: Option<DateTime<Utc>>,
    pub changefreq: Option<String>,
    pub priority: Option<Priority>,
    pub get_loc: Option<LocFn>,
    pub hreflang: Vec<HreflangLink>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("loc", &self.loc)
            .field("file", &self.file)
            .field("source", &self.source)
            .field("lastmod", &self.lastmod)
            .field("changefreq", &self.changefreq)
            .field("priority", &self.priority)
            .field("get_loc", &self.get_loc.is_some())
            .field("hreflang", &self.hreflang)
            .finish()
    }
}

/// The synthesized output record: destination file name plus document bytes.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub name: String,
    pub contents: Vec<u8>,
}
