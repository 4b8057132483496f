//! Batch driver for one sitemap build.
//!
//! A [`Pipeline`] owns everything one build needs: the validated
//! configuration, the append-only entry collection, and the namespace
//! tracker. Files are fed in arrival order through [`Pipeline::add`];
//! [`Pipeline::finish`] assembles the document and returns the single
//! output record.
//!
//! Processing is strictly sequential and order-preserving — entries appear
//! in the document in the order their files arrived. A batch with zero
//! observed files produces no output record at all rather than an empty
//! sitemap. Files skipped by the resolver (directories, `404.html`,
//! noindex pages) do not count as observed; an expand file whose data file
//! turns out unreadable does.

use crate::config::{ConfigError, SiteConfig};
use crate::entry::{self, Resolution, ResolveError};
use crate::render::{self, RenderError};
use crate::types::{Entry, InputFile, OutputFile};
use crate::urlset::UrlSet;
use log::info;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// One build invocation: feed files, then finish.
pub struct Pipeline {
    config: SiteConfig,
    entries: Vec<Entry>,
    urlset: UrlSet,
    observed: bool,
}

impl Pipeline {
    /// Validate the configuration and start an empty build.
    ///
    /// The site URL is normalized (trailing slash) here so configs built as
    /// struct literals behave the same as ones from [`SiteConfig::new`].
    pub fn new(mut config: SiteConfig) -> Result<Self, ConfigError> {
        config.normalize();
        config.validate()?;
        Ok(Self {
            config,
            entries: Vec::new(),
            urlset: UrlSet::new(),
            observed: false,
        })
    }

    /// Feed one input file through the resolver.
    pub fn add(&mut self, file: &InputFile) -> Result<(), PipelineError> {
        match entry::resolve(file, &self.config, &mut self.urlset)? {
            Resolution::Skipped => {}
            Resolution::Entries(mut entries) => {
                self.observed = true;
                self.entries.append(&mut entries);
            }
        }
        Ok(())
    }

    /// Entries accumulated so far, in arrival order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Assemble the document and hand back the output record, or `None`
    /// when no input file was observed.
    pub fn finish(mut self) -> Result<Option<OutputFile>, PipelineError> {
        if !self.observed {
            return Ok(None);
        }
        let xml = render::serialize(&self.entries, &self.config, &mut self.urlset)?;
        if self.config.verbose {
            info!("files in sitemap: {}", self.entries.len());
        }
        Ok(Some(OutputFile {
            name: self.config.file_name.clone(),
            contents: xml.into_bytes(),
        }))
    }
}
