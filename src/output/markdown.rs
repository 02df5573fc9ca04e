//! Markdown document generation
//!
//! This module renders the per-page document and the discovered-URL
//! manifest written by the Markdown directory sink.

use crate::output::DISPLAY_TIMESTAMP_FORMAT;
use crate::storage::{PageRecord, SitemapManifest};

/// Formats a fetched page as a Markdown document
///
/// The header block records the source URL and fetch time; the content
/// follows the `---` separator unchanged.
pub fn format_page_document(page: &PageRecord) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Crawled Content from {}\n\n", page.url));
    md.push_str(&format!(
        "Date: {}\n\n",
        page.fetched_at.format(DISPLAY_TIMESTAMP_FORMAT)
    ));
    md.push_str(&format!("URL: {}\n\n", page.url));
    md.push_str("---\n\n");
    md.push_str(&page.content);

    md
}

/// Formats the discovered-URL manifest as a numbered Markdown link list
///
/// # Arguments
///
/// * `manifest` - The discovery result
///
/// # Returns
///
/// A formatted markdown string
pub fn format_manifest(manifest: &SitemapManifest) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Sitemap Links from {}\n\n", manifest.base_url));
    md.push_str(&format!(
        "Date: {}\n\n",
        manifest.discovered_at.format(DISPLAY_TIMESTAMP_FORMAT)
    ));
    md.push_str(&format!("Base URL: {}\n\n", manifest.base_url));
    md.push_str(&format!("Sitemap: {}\n\n", manifest.sitemap_url));
    md.push_str(&format!("Total URLs found: {}\n\n", manifest.urls.len()));
    md.push_str("---\n\n");
    md.push_str("## All URLs in Sitemap\n\n");

    for (i, url) in manifest.urls.iter().enumerate() {
        md.push_str(&format!("{}. [{}]({})\n", i + 1, url, url));
    }

    md
}
