//! XML document assembly.
//!
//! Serializes the ordered entry collection into the final sitemap document:
//! XML declaration, root `<urlset>` tag from the namespace tracker, one
//! `<url>` block per entry in input order, closing tag — all joined with the
//! configured newline and indented with the configured spacing unit.
//!
//! Values render verbatim, exactly as the entries carry them: no XML
//! escaping, no changefreq case-normalization. `lastmod` is the one
//! exception and always renders as ISO-8601 UTC with millisecond precision.
//!
//! When image scraping is enabled each entry's source file is read back and
//! scanned for `<img src="...">` occurrences; an unreadable source is a
//! build-fatal error since the feature was explicitly requested.

use crate::config::SiteConfig;
use crate::types::Entry;
use crate::urlset::{Namespace, UrlSet};
use chrono::SecondsFormat;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read page source {path} for image scraping: {source}")]
    SourceRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\s+src="((?:https?://)?[\w./@?=&-]+)""#).expect("valid regex")
});

/// Serialize the full document. Registers the `xhtml` namespace first if any
/// entry carries alternate-language links, and resets the tracker when done
/// so the next build starts from the base state.
pub fn serialize(
    entries: &[Entry],
    config: &SiteConfig,
    urlset: &mut UrlSet,
) -> Result<String, RenderError> {
    if entries.iter().any(|entry| !entry.hreflang.is_empty()) {
        urlset.add(Namespace::Xhtml);
    }

    let mut parts = Vec::with_capacity(entries.len() + 3);
    parts.push(XML_DECLARATION.to_string());
    parts.push(urlset.open_tag());
    for entry in entries {
        parts.push(render_entry(entry, config)?);
    }
    parts.push(UrlSet::close_tag().to_string());

    urlset.reset();
    Ok(parts.join(&config.new_line))
}

/// Render one `<url>` block.
pub fn render_entry(entry: &Entry, config: &SiteConfig) -> Result<String, RenderError> {
    let sp = &config.spacing;
    let mut lines = vec![format!("{sp}<url>")];

    let loc = match &entry.get_loc {
        Some(get_loc) => get_loc(&config.site_url, &entry.loc, entry),
        None => entry.loc.clone(),
    };
    lines.push(format!("{sp}{sp}<loc>{loc}</loc>"));

    if config.images {
        for url in scrape_images(entry, config)? {
            lines.push(format!("{sp}{sp}<image:image>"));
            lines.push(format!("{sp}{sp}{sp}<image:loc>{url}</image:loc>"));
            lines.push(format!("{sp}{sp}</image:image>"));
        }
    }

    if let Some(lastmod) = entry.lastmod {
        let iso = lastmod.to_rfc3339_opts(SecondsFormat::Millis, true);
        lines.push(format!("{sp}{sp}<lastmod>{iso}</lastmod>"));
    }

    if let Some(changefreq) = &entry.changefreq
        && !changefreq.is_empty()
    {
        lines.push(format!("{sp}{sp}<changefreq>{changefreq}</changefreq>"));
    }

    if let Some(priority) = &entry.priority {
        let value = priority.resolve(&config.site_url, &entry.loc, entry);
        lines.push(format!("{sp}{sp}<priority>{value}</priority>"));
    }

    for link in &entry.hreflang {
        let href = link.href.resolve(&config.site_url, &entry.file, &link.lang, &loc);
        lines.push(format!(
            r#"{sp}{sp}<xhtml:link rel="alternate" hreflang="{}" href="{}" />"#,
            link.lang, href
        ));
    }

    lines.push(format!("{sp}</url>"));
    Ok(lines.join(&config.new_line))
}

/// Extract image URLs from the entry's source file.
///
/// Relative URLs lose a single leading `/` or `./` and get the site URL
/// prepended; absolute `http(s)` URLs pass through untouched.
fn scrape_images(entry: &Entry, config: &SiteConfig) -> Result<Vec<String>, RenderError> {
    let html = fs::read_to_string(&entry.source).map_err(|source| RenderError::SourceRead {
        path: entry.source.clone(),
        source,
    })?;

    let urls = IMG_TAG
        .captures_iter(&html)
        .map(|cap| {
            let url = &cap[1];
            if is_http_url(url) {
                url.to_string()
            } else {
                let trimmed = url
                    .strip_prefix("./")
                    .or_else(|| url.strip_prefix('/'))
                    .unwrap_or(url);
                format!("{}{trimmed}", config.site_url)
            }
        })
        .collect();
    Ok(urls)
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.contains("http://") || lower.contains("https://")
}
