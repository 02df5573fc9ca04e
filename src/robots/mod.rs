//! Robots.txt handling module
//!
//! This module fetches robots.txt, finds the sitemaps it announces and
//! answers allow/deny questions for discovered URLs.

mod parser;

pub use parser::{product_token, ParsedRobots};

use crate::crawler::fetch_text;
use crate::url::robots_url;
use crate::{HarvestError, SitemapError};
use reqwest::Client;

/// Fetches robots.txt for the site serving `site_url`
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `site_url` - Any absolute URL on the site
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - Successfully fetched robots.txt
/// * `Err(HarvestError)` - The URL was unusable or the fetch failed
pub async fn fetch_robots(client: &Client, site_url: &str) -> Result<ParsedRobots, HarvestError> {
    let url = robots_url(site_url)?;
    tracing::info!("Checking robots.txt at: {}", url);

    let body = fetch_text(client, &url).await?;
    Ok(ParsedRobots::from_content(&body))
}

/// Fetches robots.txt and returns its first `Sitemap:` directive
///
/// Every failure is logged and reported as `None`.
pub async fn find_sitemap(client: &Client, site_url: &str) -> Option<String> {
    match fetch_robots(client, site_url).await {
        Ok(robots) => {
            let sitemap = robots.first_sitemap();
            match &sitemap {
                Some(url) => tracing::info!("Found sitemap reference in robots.txt: {}", url),
                None => tracing::info!("robots.txt declares no sitemap"),
            }
            sitemap
        }
        Err(HarvestError::Sitemap(SitemapError::Status { url, status })) => {
            tracing::info!("No robots.txt at {} (HTTP {})", url, status);
            None
        }
        Err(e) => {
            tracing::warn!("Error checking robots.txt: {}", e);
            None
        }
    }
}
