//! Recursive sitemap resolution
//!
//! Resolution starts from a site address, follows sitemap indexes depth-first
//! in document order and falls back to the robots.txt `Sitemap:` directive
//! when the guessed sitemap yields nothing. Every fetch or parse failure is
//! logged where it happens and the affected branch contributes no URLs.

use crate::config::SitemapConfig;
use crate::crawler::fetch_text;
use crate::robots;
use crate::sitemap::document::{parse_document, SitemapDocument};
use crate::url::{normalize_site_url, sitemap_candidate};
use crate::SitemapError;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use std::collections::HashSet;

/// Result of resolving a site address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Normalized site address (scheme present, no trailing slash)
    pub base_url: String,
    /// Sitemap the URLs came from, or the guessed sitemap when none was found
    pub sitemap_url: String,
    /// Page URLs in document order
    pub urls: Vec<String>,
}

impl Resolution {
    /// Returns true when no page URLs were discovered
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Discovers page URLs through sitemaps
#[derive(Debug, Clone)]
pub struct SitemapResolver {
    client: Client,
    max_depth: u32,
}

impl SitemapResolver {
    /// Creates a resolver
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client carrying the browser-like header set
    /// * `max_depth` - Deepest sitemap-index nesting followed; the sitemap a
    ///   resolution starts from is depth 0
    pub fn new(client: Client, max_depth: u32) -> Self {
        Self { client, max_depth }
    }

    pub fn from_config(client: Client, config: &SitemapConfig) -> Self {
        Self::new(client, config.max_depth)
    }

    /// Resolves a site address to its sitemap and page URLs
    ///
    /// Never fails: when neither the guessed sitemap nor a robots.txt
    /// directive produces URLs, the guessed sitemap address is returned with
    /// an empty list.
    pub async fn resolve(&self, site_url: &str) -> Resolution {
        let base_url = normalize_site_url(site_url);
        let candidate = sitemap_candidate(&base_url);

        tracing::info!("Checking sitemap at: {}", candidate);
        let urls = self.urls_from_sitemap(&candidate).await;
        if !urls.is_empty() {
            return Resolution {
                base_url,
                sitemap_url: candidate,
                urls,
            };
        }

        tracing::info!("No URLs found at {}, checking robots.txt", candidate);
        if let Some(alternate) = robots::find_sitemap(&self.client, &base_url).await {
            let urls = self.urls_from_sitemap(&alternate).await;
            if !urls.is_empty() {
                return Resolution {
                    base_url,
                    sitemap_url: alternate,
                    urls,
                };
            }
        }

        tracing::info!("No sitemap URLs discovered for {}", base_url);
        Resolution {
            base_url,
            sitemap_url: candidate,
            urls: Vec::new(),
        }
    }

    /// Collects every page URL reachable from one sitemap address
    ///
    /// The address is used as-is (no `/sitemap.xml` guessing). Sitemap
    /// indexes are followed recursively; an address seen earlier in the same
    /// traversal is skipped, as is any branch nested deeper than the
    /// configured limit.
    pub async fn urls_from_sitemap(&self, sitemap_url: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut urls = Vec::new();
        self.collect(sitemap_url.to_string(), 0, &mut visited, &mut urls)
            .await;
        urls
    }

    fn collect<'a>(
        &'a self,
        sitemap_url: String,
        depth: u32,
        visited: &'a mut HashSet<String>,
        urls: &'a mut Vec<String>,
    ) -> BoxFuture<'a, ()> {
        async move {
            if depth > self.max_depth {
                tracing::warn!(
                    "Sitemap nesting deeper than {} at {}, skipping",
                    self.max_depth,
                    sitemap_url
                );
                return;
            }
            if !visited.insert(sitemap_url.clone()) {
                tracing::warn!("Sitemap {} already visited, skipping", sitemap_url);
                return;
            }

            let document = match self.load(&sitemap_url).await {
                Ok(document) => document,
                Err(SitemapError::Status { url, status }) => {
                    tracing::info!("Sitemap not available at {} (HTTP {})", url, status);
                    return;
                }
                Err(e) => {
                    tracing::warn!("Error processing sitemap: {}", e);
                    return;
                }
            };

            if document.is_index() {
                tracing::info!("Found sitemap index at {}", sitemap_url);
                tracing::info!(
                    "Found {} sitemaps in sitemap index",
                    document.locations.len()
                );
                for child in document.locations {
                    self.collect(child, depth + 1, visited, urls).await;
                }
            } else {
                tracing::info!(
                    "Found {} URLs in sitemap {}",
                    document.locations.len(),
                    sitemap_url
                );
                urls.extend(document.locations);
            }
        }
        .boxed()
    }

    async fn load(&self, sitemap_url: &str) -> Result<SitemapDocument, SitemapError> {
        let body = fetch_text(&self.client, sitemap_url).await?;
        parse_document(&body).map_err(|source| SitemapError::Parse {
            url: sitemap_url.to_string(),
            source,
        })
    }
}
