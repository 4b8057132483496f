//! Shared test utilities for the sitemapper test suite.
//!
//! Small builders for the records most tests need: a stock [`SiteConfig`],
//! a buffered [`InputFile`], and a minimal [`Entry`].

use crate::config::SiteConfig;
use crate::types::{Entry, InputFile};
use std::path::PathBuf;

/// A stock config for the given site URL.
pub fn site(url: &str) -> SiteConfig {
    SiteConfig::new(url)
}

/// A regular buffered page file with placeholder contents.
pub fn page(relative: &str) -> InputFile {
    InputFile::new(relative, "hello there")
}

/// A minimal entry with the given loc and nothing else set.
pub fn entry(loc: &str) -> Entry {
    Entry {
        loc: loc.to_string(),
        file: String::new(),
        source: PathBuf::from("page.html"),
        lastmod: None,
        changefreq: None,
        priority: None,
        get_loc: None,
        hreflang: Vec::new(),
    }
}
