//! URL handling module for Sitemap Harvest
//!
//! This module provides site-address normalization, sitemap address guessing,
//! robots.txt location and file-name slugs derived from URLs.

mod domain;
mod normalize;
mod slug;

// Re-export main functions
pub use domain::{extract_host, robots_url};
pub use normalize::{names_sitemap, normalize_site_url, sitemap_candidate};
pub use slug::{file_stem, sanitize_file_name};
