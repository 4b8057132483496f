//! Root-element namespace tracking.
//!
//! The `<urlset>` root tag declares the base sitemap namespace plus one
//! optional declaration per enabled extension (alternate-language links,
//! images, videos). [`UrlSet`] accumulates which declarations a build needs,
//! in first-added order, and renders the opening tag.
//!
//! A `UrlSet` is a per-build value owned by the pipeline, never shared
//! process-wide. [`UrlSet::reset`] restores the base state after a document
//! is assembled so a reused pipeline value cannot carry namespaces into the
//! next build.

/// Recognized XML namespace declarations for the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Sitemap,
    Xhtml,
    Image,
    Video,
}

impl Namespace {
    /// The `xmlns` attribute text for this namespace.
    pub fn attribute(self) -> &'static str {
        match self {
            Namespace::Sitemap => r#"xmlns="http://www.sitemaps.org/schemas/sitemap/0.9""#,
            Namespace::Xhtml => r#"xmlns:xhtml="http://www.w3.org/1999/xhtml""#,
            Namespace::Image => r#"xmlns:image="http://www.google.com/schemas/sitemap-image/1.1""#,
            Namespace::Video => r#"xmlns:video="http://www.google.com/schemas/sitemap-video/1.1""#,
        }
    }
}

/// Ordered set of namespace declarations, initialized to the mandatory
/// sitemap namespace.
#[derive(Debug, Clone)]
pub struct UrlSet {
    attributes: Vec<Namespace>,
}

impl Default for UrlSet {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlSet {
    pub fn new() -> Self {
        Self {
            attributes: vec![Namespace::Sitemap],
        }
    }

    /// Register a namespace. Duplicates are ignored; order is first-added.
    pub fn add(&mut self, namespace: Namespace) {
        if !self.attributes.contains(&namespace) {
            self.attributes.push(namespace);
        }
    }

    /// Render the root element opening tag with all registered namespaces.
    pub fn open_tag(&self) -> String {
        let mut tag = String::from("<urlset");
        for namespace in &self.attributes {
            tag.push(' ');
            tag.push_str(namespace.attribute());
        }
        tag.push('>');
        tag
    }

    pub fn close_tag() -> &'static str {
        "</urlset>"
    }

    /// Restore the base state (sitemap namespace only). Called once per
    /// completed document build.
    pub fn reset(&mut self) {
        self.attributes.clear();
        self.attributes.push(Namespace::Sitemap);
    }
}
