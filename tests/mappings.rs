//! End-to-end tests over the public pipeline API: sitewide defaults,
//! mapping-rule overrides, hreflang/getLoc callbacks, image scraping,
//! video namespaces, and expand mode.

use sitemapper::config::{ExpandSpec, MappingRule, SiteConfig};
use sitemapper::pipeline::Pipeline;
use sitemapper::types::{Href, HreflangLink, InputFile, Lastmod, Priority};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

fn test_page() -> InputFile {
    InputFile::new("fixtures/test.html", "hello there")
}

fn build(config: SiteConfig, files: &[InputFile]) -> String {
    let mut pipeline = Pipeline::new(config).unwrap();
    for file in files {
        pipeline.add(file).unwrap();
    }
    let output = pipeline.finish().unwrap().expect("expected an output file");
    assert_eq!(output.name, "sitemap.xml");
    String::from_utf8(output.contents).unwrap()
}

#[test]
fn defaults_apply_when_mappings_do_not_match() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.changefreq = Some("daily".to_string());
    config.priority = Some(Priority::Fixed(0.5));
    config.mappings = vec![MappingRule {
        pages: vec!["*/*test2222.html".to_string()],
        changefreq: Some("hourly".to_string()),
        priority: Some(Priority::Fixed(0.5)),
        ..Default::default()
    }];

    let contents = build(config, &[test_page()]);
    assert!(contents.contains("test.html"));
    assert!(!contents.contains("home.html"));
    assert!(contents.contains("<loc>http://www.amazon.com/fixtures/test.html</loc>"));
    assert!(contents.contains("<changefreq>daily</changefreq>"));
    assert!(contents.contains("<priority>0.5</priority>"));
}

#[test]
fn matching_mapping_overrides_defaults() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.changefreq = Some("daily".to_string());
    config.mappings = vec![MappingRule {
        pages: vec!["*/*test.html".to_string()],
        changefreq: Some("hourly".to_string()),
        priority: Some(Priority::Fixed(0.4)),
        ..Default::default()
    }];

    let contents = build(config, &[test_page()]);
    assert!(contents.contains("<loc>http://www.amazon.com/fixtures/test.html</loc>"));
    assert!(contents.contains("<changefreq>hourly</changefreq>"));
    assert!(contents.contains("<priority>0.4</priority>"));
}

#[test]
fn only_the_first_matching_mapping_applies() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.mappings = vec![
        MappingRule {
            pages: vec!["*/*test.html".to_string()],
            changefreq: Some("hourly".to_string()),
            priority: Some(Priority::Fixed(0.4)),
            ..Default::default()
        },
        MappingRule {
            pages: vec!["*/*test.html".to_string()],
            changefreq: Some("yearly".to_string()),
            priority: Some(Priority::Fixed(0.2)),
            ..Default::default()
        },
    ];

    let contents = build(config, &[test_page()]);
    assert!(contents.contains("<changefreq>hourly</changefreq>"));
    assert!(contents.contains("<priority>0.4</priority>"));
}

#[test]
fn unset_mapping_field_is_not_invented() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.mappings = vec![MappingRule {
        pages: vec!["*/*test.html".to_string()],
        changefreq: Some("hourly".to_string()),
        ..Default::default()
    }];

    let contents = build(config, &[test_page()]);
    assert!(contents.contains("<changefreq>hourly</changefreq>"));
    assert!(!contents.contains("<priority>"));
}

#[test]
fn priority_zero_is_allowed_in_mappings() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.mappings = vec![MappingRule {
        pages: vec!["*/*test.html".to_string()],
        changefreq: Some("hourly".to_string()),
        priority: Some(Priority::Fixed(0.0)),
        ..Default::default()
    }];

    let contents = build(config, &[test_page()]);
    assert!(contents.contains("<changefreq>hourly</changefreq>"));
    assert!(contents.contains("<priority>0</priority>"));
}

#[test]
fn lastmod_omitted_when_disabled_everywhere() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.lastmod = Lastmod::Omit;
    config.mappings = vec![MappingRule {
        pages: vec!["*/*test.html".to_string()],
        lastmod: Some(Lastmod::Omit),
        ..Default::default()
    }];

    let contents = build(config, &[test_page()]);
    assert!(!contents.contains("<lastmod>"));
}

#[test]
fn mapping_reenables_lastmod_over_sitewide_optout() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.lastmod = Lastmod::Omit;
    config.mappings = vec![MappingRule {
        pages: vec!["*/*test.html".to_string()],
        lastmod: Some(Lastmod::Auto),
        ..Default::default()
    }];

    let contents = build(config, &[test_page()]);
    let start = contents.find("<lastmod>").expect("lastmod tag missing");
    let end = contents.find("</lastmod>").unwrap();
    let stamp = &contents[start + "<lastmod>".len()..end];
    // ISO-8601 UTC, e.g. 2026-08-27T10:00:00.000Z
    assert!(stamp.ends_with('Z'), "not UTC: {stamp}");
    assert_eq!(&stamp[4..5], "-");
    assert_eq!(&stamp[10..11], "T");
}

#[test]
fn hreflang_mappings_declare_xhtml_namespace() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.mappings = vec![MappingRule {
        pages: vec!["*/*test.html".to_string()],
        hreflang: Some(vec![
            HreflangLink {
                lang: "ru".to_string(),
                href: Href::Computed(Arc::new(|_, file, _, _| {
                    format!("http://www.amazon.ru/{file}")
                })),
            },
            HreflangLink {
                lang: "de".to_string(),
                href: Href::Computed(Arc::new(|_, file, _, _| {
                    format!("http://www.amazon.de/{file}")
                })),
            },
        ]),
        ..Default::default()
    }];

    let contents = build(config, &[test_page()]);
    assert!(contents.contains(r#"hreflang="ru""#));
    assert!(contents.contains("www.amazon.ru"));
    assert!(contents.contains(r#"hreflang="de""#));
    assert!(contents.contains("www.amazon.de"));
    assert!(contents.contains(
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">"#
    ));
}

#[test]
fn get_loc_mapping_modifies_the_loc() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.mappings = vec![MappingRule {
        pages: vec!["*/*test.html".to_string()],
        get_loc: Some(Arc::new(|_, loc: &str, _: &sitemapper::types::Entry| {
            // Removes the file extension
            match loc.rfind('.') {
                Some(dot) => loc[..dot].to_string(),
                None => loc.to_string(),
            }
        })),
        ..Default::default()
    }];

    let contents = build(config, &[test_page()]);
    assert!(contents.contains("/test</loc>"));
    assert!(contents.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
}

#[test]
fn images_are_mapped_from_page_sources() {
    let tmp = tempfile::TempDir::new().unwrap();
    let page_path = tmp.path().join("images.html");
    let mut f = std::fs::File::create(&page_path).unwrap();
    write!(
        f,
        r#"<html><body>
<img src="https://via.placeholder.com/300/09f/fff.png">
<img src="/assets/images/placeholder.jpg">
<img src="https://via.placeholder.com/300/09f/000.png">
<img src="https://via.placeholder.com/300/09f/f5f.png">
<img src="./assets/images/placeholder_small.jpg">
<img src="assets/images/placeholder-responsive@250.jpg">
<img src="/assets/images/placeholder.jpg?cache=1&id=2">
</body></html>"#
    )
    .unwrap();

    let mut config = SiteConfig::new("http://www.amazon.com");
    config.images = true;
    let mut file = InputFile::new("fixtures/images.html", "hello there");
    file.source = page_path;

    let contents = build(config, &[file]);
    assert!(contents.contains(
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">"#
    ));
    assert!(contents.contains("<image:loc>https://via.placeholder.com/300/09f/fff.png</image:loc>"));
    assert!(contents.contains("<image:loc>http://www.amazon.com/assets/images/placeholder.jpg</image:loc>"));
    assert!(contents.contains("<image:loc>https://via.placeholder.com/300/09f/000.png</image:loc>"));
    assert!(contents.contains("<image:loc>https://via.placeholder.com/300/09f/f5f.png</image:loc>"));
    assert!(contents.contains("<image:loc>http://www.amazon.com/assets/images/placeholder_small.jpg</image:loc>"));
    assert!(contents.contains(
        "<image:loc>http://www.amazon.com/assets/images/placeholder-responsive@250.jpg</image:loc>"
    ));
    assert!(contents.contains(
        "<image:loc>http://www.amazon.com/assets/images/placeholder.jpg?cache=1&id=2</image:loc>"
    ));
}

#[test]
fn image_namespace_declared_even_without_images_on_page() {
    let tmp = tempfile::TempDir::new().unwrap();
    let page_path = tmp.path().join("test.html");
    std::fs::write(&page_path, "hello there").unwrap();

    let mut config = SiteConfig::new("http://www.amazon.com");
    config.images = true;
    let mut file = InputFile::new("fixtures/test.html", "hello there");
    file.source = page_path;

    let contents = build(config, &[file]);
    // Namespace reflects the feature flag, not per-page content.
    assert!(contents.contains("xmlns:image"));
    assert!(!contents.contains("<image:loc>"));
    assert!(!contents.contains("<image:image>"));
}

#[test]
fn videos_flag_adds_video_namespace() {
    let mut config = SiteConfig::new("http://www.amazon.com");
    config.videos = true;

    let contents = build(config, &[InputFile::new("fixtures/videos.html", "hello there")]);
    assert!(contents.contains(
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:video="http://www.google.com/schemas/sitemap-video/1.1">"#
    ));
}

#[test]
fn expand_adds_urls_for_nested_index_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let data_file = tmp.path().join("test.json");
    std::fs::write(&data_file, r#"[{"title":"lorem"},{"title":"ipsum"}]"#).unwrap();

    let mut config = SiteConfig::new("http://www.amazon.com");
    config.expand.insert(
        "fixtures/videos/index.html".to_string(),
        ExpandSpec {
            data_file,
            key: "title".to_string(),
        },
    );

    let contents = build(
        config,
        &[InputFile::new("fixtures/videos/index.html", "hello there")],
    );
    assert!(contents.contains("<loc>http://www.amazon.com/fixtures/videos/lorem</loc>"));
    assert!(contents.contains("<loc>http://www.amazon.com/fixtures/videos/ipsum</loc>"));
}

#[test]
fn expand_adds_urls_for_plain_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let data_file = tmp.path().join("test.json");
    std::fs::write(&data_file, r#"[{"title":"lorem"},{"title":"ipsum"}]"#).unwrap();

    let mut config = SiteConfig::new("http://www.amazon.com");
    config.expand.insert(
        "fixtures/videos.php".to_string(),
        ExpandSpec {
            data_file,
            key: "title".to_string(),
        },
    );

    let contents = build(
        config,
        &[InputFile::new("fixtures/videos.php", "hello there")],
    );
    assert!(contents.contains("<loc>http://www.amazon.com/fixtures/videos/lorem</loc>"));
    assert!(contents.contains("<loc>http://www.amazon.com/fixtures/videos/ipsum</loc>"));
}

#[test]
fn document_shape_matches_the_protocol() {
    let mut config = SiteConfig::new("http://x.com");
    config.changefreq = Some("daily".to_string());
    config.priority = Some(Priority::Fixed(0.5));
    config.lastmod = Lastmod::Omit;

    let contents = build(config, &[test_page()]);
    assert_eq!(
        contents,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
         \x20   <url>\n\
         \x20       <loc>http://x.com/fixtures/test.html</loc>\n\
         \x20       <changefreq>daily</changefreq>\n\
         \x20       <priority>0.5</priority>\n\
         \x20   </url>\n\
         </urlset>"
    );
}

#[test]
fn entries_with_noindex_meta_are_dropped() {
    let mut config = SiteConfig::new("http://x.com");
    config.noindex = true;

    let noindex = InputFile::new(
        "private.html",
        r#"<html><head><meta name="robots" content="noindex"></head></html>"#,
    );
    let contents = build(config, &[test_page(), noindex]);
    assert!(contents.contains("fixtures/test.html"));
    assert!(!contents.contains("private.html"));
}

#[test]
fn not_found_pages_are_absent_from_output() {
    let config = SiteConfig::new("http://x.com");
    let contents = build(
        config,
        &[test_page(), InputFile::new("404.HTML", "oops"), InputFile::new("de/404.htm", "oops")],
    );
    assert!(!contents.contains("404"));
}

#[test]
fn index_collapsing_in_full_documents() {
    let config = SiteConfig::new("http://x.com");
    let contents = build(
        config,
        &[
            InputFile::new("a/b/index.html", "hello"),
            InputFile::new("index.html", "hello"),
        ],
    );
    assert!(contents.contains("<loc>http://x.com/a/b/</loc>"));
    assert!(contents.contains("<loc>http://x.com/</loc>"));
}

#[test]
fn source_read_failure_is_fatal_with_images_enabled() {
    let mut config = SiteConfig::new("http://x.com");
    config.images = true;

    let mut file = InputFile::new("gone.html", "hello");
    file.source = PathBuf::from("/nonexistent/gone.html");

    let mut pipeline = Pipeline::new(config).unwrap();
    pipeline.add(&file).unwrap();
    assert!(pipeline.finish().is_err());
}
