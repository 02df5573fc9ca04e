//! Sitemap discovery module
//!
//! This module parses sitemaps.org 0.9 documents and resolves a site address
//! to the ordered list of page URLs its sitemaps declare.

mod document;
mod resolver;

pub use document::{parse_document, DocumentError, DocumentKind, SitemapDocument, SITEMAP_NAMESPACE};
pub use resolver::{Resolution, SitemapResolver};
