//! Site configuration.
//!
//! Two layers, following the same split as the rest of the crate:
//!
//! - [`SiteConfig`] is the programmatic configuration the pipeline consumes.
//!   It can hold callbacks ([`LocFn`], computed priorities, hreflang
//!   resolvers), so it is built in code, not deserialized.
//! - [`ConfigFile`] is the TOML layer for the CLI. It covers every data-only
//!   option and converts into a `SiteConfig`. Unknown keys are rejected to
//!   catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! site_url = "https://www.example.com"   # required; trailing slash auto-appended
//!
//! # file_name = "sitemap.xml"
//! # changefreq = "daily"
//! # priority = 0.5
//! # lastmod = false              # false = omit, true = file mtime, or RFC3339 timestamp
//! # noindex = true               # skip pages carrying a robots noindex meta tag
//! # index_replace = ["html"]     # index.<ext> collapses to the directory URL
//! # images = true                # scrape <img src> URLs into image:image blocks
//! # videos = true                # declare the video namespace on the root tag
//!
//! [[mappings]]
//! pages = ["blog/**", "!blog/drafts/**"]
//! changefreq = "weekly"
//! priority = 0.8
//!
//! [expand."catalog/items.html"]
//! data_file = "data/items.json"
//! key = "slug"
//! ```
//!
//! Mapping rules are matched in declared order and the first matching rule
//! wins wholesale — fields it leaves unset fall through to the sitewide
//! defaults, never to a later rule.

use crate::types::{HreflangLink, Href, Lastmod, LocFn, Priority};
use chrono::{DateTime, Utc};
use glob::Pattern;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("site_url is a required param")]
    MissingSiteUrl,
    #[error("changeFreq has been deprecated, use changefreq instead")]
    DeprecatedChangeFreq,
    #[error("invalid lastmod timestamp: {0}")]
    InvalidLastmod(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Change frequencies the sitemap protocol recognizes.
pub const VALID_CHANGE_FREQUENCIES: &[&str] = &[
    "always", "hourly", "daily", "weekly", "monthly", "yearly", "never",
];

/// Whether a changefreq value is one the protocol allows.
///
/// Empty values are valid (the tag is simply omitted). This check is never
/// applied during serialization — values render verbatim — it exists for
/// callers who want to assert conformance themselves (the CLI `check`
/// command does).
pub fn is_changefreq_valid(changefreq: &str) -> bool {
    changefreq.is_empty()
        || VALID_CHANGE_FREQUENCIES.contains(&changefreq.to_lowercase().as_str())
}

/// Expand-mode descriptor: one input file fans out into one entry per record
/// of the JSON array in `data_file`, using the record's value at `key` as
/// the URL extension.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpandSpec {
    pub data_file: PathBuf,
    pub key: String,
}

/// A per-glob override bundle for the sitewide defaults.
#[derive(Clone, Default)]
pub struct MappingRule {
    /// Glob patterns matched against the normalized relative path.
    /// Evaluated in order; `!`-prefixed patterns subtract previous matches.
    pub pages: Vec<String>,
    pub changefreq: Option<String>,
    pub priority: Option<Priority>,
    pub lastmod: Option<Lastmod>,
    pub get_loc: Option<LocFn>,
    /// `Some` (even empty) overrides the sitewide hreflang list entirely.
    pub hreflang: Option<Vec<HreflangLink>>,
}

impl MappingRule {
    /// Whether this rule's pattern set matches the given relative path.
    ///
    /// Invalid glob patterns are skipped rather than treated as errors.
    pub fn matches(&self, path: &str) -> bool {
        let mut matched = false;
        for pattern in &self.pages {
            if let Some(negated) = pattern.strip_prefix('!') {
                if let Ok(p) = Pattern::new(negated)
                    && p.matches(path)
                {
                    matched = false;
                }
            } else if let Ok(p) = Pattern::new(pattern)
                && p.matches(path)
            {
                matched = true;
            }
        }
        matched
    }
}

/// Sitewide configuration for one build.
#[derive(Clone)]
pub struct SiteConfig {
    /// Base URL of the site. Always ends with `/`.
    pub site_url: String,
    /// Destination file name for the generated document.
    pub file_name: String,
    pub changefreq: Option<String>,
    pub priority: Option<Priority>,
    pub lastmod: Lastmod,
    pub get_loc: Option<LocFn>,
    pub hreflang: Vec<HreflangLink>,
    /// Indentation unit (block level = 1×, field level = 2×).
    pub spacing: String,
    pub new_line: String,
    pub verbose: bool,
    /// Skip files whose contents carry a robots noindex meta tag.
    pub noindex: bool,
    /// Extensions whose `index.<ext>` files collapse to the directory URL.
    pub index_replace: Vec<String>,
    /// Normalized relative path → expand descriptor.
    pub expand: BTreeMap<String, ExpandSpec>,
    pub images: bool,
    pub videos: bool,
    pub mappings: Vec<MappingRule>,
}

impl SiteConfig {
    /// A config with the stock defaults and the given site URL
    /// (trailing slash appended if missing).
    pub fn new(site_url: impl Into<String>) -> Self {
        let mut config = Self {
            site_url: site_url.into(),
            file_name: "sitemap.xml".to_string(),
            changefreq: None,
            priority: None,
            lastmod: Lastmod::Auto,
            get_loc: None,
            hreflang: Vec::new(),
            spacing: "    ".to_string(),
            new_line: "\n".to_string(),
            verbose: false,
            noindex: false,
            index_replace: vec!["html".to_string()],
            expand: BTreeMap::new(),
            images: false,
            videos: false,
            mappings: Vec::new(),
        };
        config.normalize();
        config
    }

    /// Append the trailing slash to `site_url` if missing.
    pub fn normalize(&mut self) {
        if !self.site_url.is_empty() && !self.site_url.ends_with('/') {
            self.site_url.push('/');
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_url.is_empty() {
            return Err(ConfigError::MissingSiteUrl);
        }
        Ok(())
    }

    /// First mapping rule matching the given normalized path, if any.
    pub fn mapping_for(&self, path: &str) -> Option<&MappingRule> {
        self.mappings.iter().find(|rule| rule.matches(path))
    }
}

// ============================================================================
// TOML config-file layer (CLI)
// ============================================================================

/// `lastmod` as written in TOML: a flag or a timestamp string.
///
/// `false` opts out of the tag entirely; `true` means "use the file mtime"
/// (the default when the key is absent); a string is parsed as RFC3339.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LastmodValue {
    Enabled(bool),
    Timestamp(String),
}

impl LastmodValue {
    fn to_lastmod(&self) -> Result<Lastmod, ConfigError> {
        match self {
            LastmodValue::Enabled(false) => Ok(Lastmod::Omit),
            LastmodValue::Enabled(true) => Ok(Lastmod::Auto),
            LastmodValue::Timestamp(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Lastmod::At(dt.with_timezone(&Utc)))
                .map_err(|e| ConfigError::InvalidLastmod(format!("{s}: {e}"))),
        }
    }
}

/// One hreflang descriptor in TOML. `href` is a template; `{siteUrl}`,
/// `{file}`, `{lang}` and `{loc}` are substituted per entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HreflangFile {
    pub lang: String,
    pub href: String,
}

impl HreflangFile {
    fn to_link(&self) -> HreflangLink {
        HreflangLink {
            lang: self.lang.clone(),
            href: Href::Template(self.href.clone()),
        }
    }
}

/// One mapping rule in TOML (data-only fields).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingRuleFile {
    pub pages: Vec<String>,
    pub changefreq: Option<String>,
    pub priority: Option<f64>,
    pub lastmod: Option<LastmodValue>,
    pub hreflang: Vec<HreflangFile>,
}

/// The CLI config file. All keys optional except `site_url`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub site_url: Option<String>,
    /// Trap for the pre-rename spelling; rejected with a pointer to
    /// `changefreq` so migrating users get a real message instead of an
    /// unknown-key error.
    #[serde(rename = "changeFreq")]
    change_freq_deprecated: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<f64>,
    pub lastmod: Option<LastmodValue>,
    pub file_name: Option<String>,
    pub spacing: Option<String>,
    pub new_line: Option<String>,
    pub verbose: bool,
    pub noindex: bool,
    pub index_replace: Option<Vec<String>>,
    pub expand: BTreeMap<String, ExpandSpec>,
    pub images: bool,
    pub videos: bool,
    pub hreflang: Vec<HreflangFile>,
    pub mappings: Vec<MappingRuleFile>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Convert into the pipeline configuration, validating as the original
    /// plugin does up front: missing site URL and the deprecated option are
    /// fatal before any file is processed.
    pub fn into_site_config(self) -> Result<SiteConfig, ConfigError> {
        if self.change_freq_deprecated.is_some() {
            return Err(ConfigError::DeprecatedChangeFreq);
        }
        let site_url = match self.site_url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(ConfigError::MissingSiteUrl),
        };

        let mut config = SiteConfig::new(site_url);
        config.changefreq = self.changefreq;
        config.priority = self.priority.map(Priority::Fixed);
        if let Some(value) = &self.lastmod {
            config.lastmod = value.to_lastmod()?;
        }
        if let Some(file_name) = self.file_name {
            config.file_name = file_name;
        }
        if let Some(spacing) = self.spacing {
            config.spacing = spacing;
        }
        if let Some(new_line) = self.new_line {
            config.new_line = new_line;
        }
        config.verbose = self.verbose;
        config.noindex = self.noindex;
        if let Some(index_replace) = self.index_replace {
            config.index_replace = index_replace;
        }
        config.expand = self.expand;
        config.images = self.images;
        config.videos = self.videos;
        config.hreflang = self.hreflang.iter().map(HreflangFile::to_link).collect();
        for rule in self.mappings {
            config.mappings.push(MappingRule {
                pages: rule.pages,
                changefreq: rule.changefreq,
                priority: rule.priority.map(Priority::Fixed),
                lastmod: match &rule.lastmod {
                    Some(value) => Some(value.to_lastmod()?),
                    None => None,
                },
                get_loc: None,
                hreflang: if rule.hreflang.is_empty() {
                    None
                } else {
                    Some(rule.hreflang.iter().map(HreflangFile::to_link).collect())
                },
            });
        }
        Ok(config)
    }
}

/// A documented starter config, printed by `sitemapper gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# sitemapper configuration. All options except site_url are optional.

site_url = "https://www.example.com"

# Destination file name for the generated document.
# file_name = "sitemap.xml"

# Sitewide defaults for every entry. changefreq is one of: always, hourly,
# daily, weekly, monthly, yearly, never.
# changefreq = "daily"
# priority = 0.5

# lastmod: omit the key to use each file's mtime, set false to drop the tag
# entirely, or give a fixed RFC3339 timestamp.
# lastmod = false
# lastmod = "2026-01-01T00:00:00Z"

# Skip pages whose HTML carries a robots noindex meta tag.
# noindex = true

# index.<ext> files collapse to their directory URL (foo/index.html -> foo/).
# index_replace = ["html"]

# Scrape <img src> URLs from each page into image:image blocks.
# images = true

# Declare the video namespace on the root tag.
# videos = true

# Per-glob overrides. Rules are matched in order; the first match wins.
# [[mappings]]
# pages = ["blog/**", "!blog/drafts/**"]
# changefreq = "weekly"
# priority = 0.8
# hreflang = [{ lang = "de", href = "https://www.example.de/{file}" }]

# Fan one file out into an entry per record of a JSON data file.
# [expand."catalog/items.html"]
# data_file = "data/items.json"
# key = "slug"
"##
}
