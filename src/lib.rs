//! # sitemapper
//!
//! A sitemap generator for static-site build pipelines. Each processed page
//! file contributes zero or more URL entries; at the end of the batch a
//! single standards-compliant `sitemap.xml` document is produced.
//!
//! # Architecture: Three Components, One Pipeline
//!
//! ```text
//! input file → Entry Resolver → Entry ─┐
//! input file → Entry Resolver → Entry ─┼→ Document Assembler → sitemap.xml
//! input file → Entry Resolver → Entry ─┘        ↑
//!                                      Namespace Tracker
//! ```
//!
//! - The **Entry Resolver** ([`entry`]) merges sitewide defaults with the
//!   first matching per-glob mapping rule into a normalized entry record,
//!   optionally fanning one file out into many entries from a JSON data
//!   file ("expand" mode).
//! - The **Namespace Tracker** ([`urlset`]) accumulates which optional XML
//!   namespace declarations (image, video, alternate-language) the root
//!   element needs.
//! - The **Document Assembler** ([`render`]) serializes the ordered entry
//!   collection into the final XML text.
//!
//! The [`pipeline::Pipeline`] ties the three together for one build:
//! sequential, order-preserving, no state surviving across builds.
//!
//! # Usage
//!
//! ```no_run
//! use sitemapper::config::SiteConfig;
//! use sitemapper::pipeline::Pipeline;
//! use sitemapper::types::InputFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = SiteConfig::new("https://www.example.com");
//! config.changefreq = Some("daily".to_string());
//!
//! let mut pipeline = Pipeline::new(config)?;
//! pipeline.add(&InputFile::new("index.html", "<html>…</html>"))?;
//! pipeline.add(&InputFile::new("about/index.html", "<html>…</html>"))?;
//!
//! if let Some(output) = pipeline.finish()? {
//!     std::fs::write(&output.name, &output.contents)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `SiteConfig`, mapping rules, changefreq validity, the TOML config-file layer |
//! | [`entry`] | Entry Resolver — skip checks, path normalization, override merge, expand fan-out |
//! | [`urlset`] | Namespace Tracker for the root element |
//! | [`render`] | Document Assembler — XML assembly and image scraping |
//! | [`pipeline`] | Batch driver owning the entry collection and tracker for one build |
//! | [`types`] | Shared records: input files, entries, output file, value-or-callback unions |
//!
//! # Design Decisions
//!
//! ## Values Render Verbatim
//!
//! The assembler emits entry values exactly as resolved: no XML escaping, no
//! changefreq case-normalization, and a priority of `0` always renders as
//! `<priority>0</priority>` — a real value, never "absent". Conformance
//! checking is opt-in via [`config::is_changefreq_valid`].
//!
//! ## Zero Input, Zero Output
//!
//! A batch that observes no input files emits no output record at all — an
//! empty sitemap is never written. Skipped files (directories, `404.html`,
//! noindex pages) do not count as observed.
//!
//! ## Per-Build Namespace State
//!
//! The namespace tracker is a value owned by each pipeline, constructed
//! fresh per build and reset after serialization — namespace declarations
//! can never leak from one build into the next.

pub mod config;
pub mod entry;
pub mod pipeline;
pub mod render;
pub mod types;
pub mod urlset;

#[cfg(test)]
pub(crate) mod test_helpers;
