//! Run driver: one complete harvest of a site
//!
//! A run resolves the site's sitemap, records the discovered URLs as a
//! manifest, narrows them to the requested selection, crawls the result and
//! writes a run log describing every step. When no sitemap URLs are found the
//! base address alone is crawled.

use crate::config::Config;
use crate::crawler::{build_http_client, CrawlOrchestrator, CrawlSettings, HttpFetchClient};
use crate::output::{format_duration, RunLog, RunStatistics, DISPLAY_TIMESTAMP_FORMAT};
use crate::robots::{fetch_robots, ParsedRobots};
use crate::sitemap::SitemapResolver;
use crate::storage::{open_sink, PageSink, SitemapManifest};
use crate::url::normalize_site_url;
use crate::HarvestError;
use chrono::Local;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How many of the discovered URLs to crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlSelection {
    /// Every discovered URL
    #[default]
    All,
    /// The first `n` discovered URLs, clamped to `1..=discovered`
    Limit(usize),
}

/// What a run decided to crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlDecision {
    /// Every discovered URL
    All { count: usize },
    /// A prefix of the discovered URLs
    Subset { selected: usize, discovered: usize },
    /// Nothing was discovered; only the base address is crawled
    BaseOnly,
    /// URLs were discovered but robots.txt disallows every one of them
    NothingAllowed { discovered: usize },
}

impl CrawlSelection {
    /// Narrows `discovered` to the URLs that will be crawled
    ///
    /// Order is preserved. A limit covering the whole list is reported as
    /// [`CrawlDecision::All`].
    pub fn apply(self, mut discovered: Vec<String>) -> (Vec<String>, CrawlDecision) {
        let total = discovered.len();
        match self {
            CrawlSelection::Limit(n) if n.clamp(1, total.max(1)) < total => {
                let selected = n.max(1);
                discovered.truncate(selected);
                (
                    discovered,
                    CrawlDecision::Subset {
                        selected,
                        discovered: total,
                    },
                )
            }
            _ => (discovered, CrawlDecision::All { count: total }),
        }
    }
}

impl CrawlDecision {
    /// One-line description used in logs
    pub fn describe(&self, base_url: &str) -> String {
        match self {
            CrawlDecision::All { count } => format!("Crawling all {} URLs...", count),
            CrawlDecision::Subset { selected, discovered } => {
                format!("Crawling {} of {} URLs...", selected, discovered)
            }
            CrawlDecision::BaseOnly => format!(
                "No sitemap found or empty sitemap for {}. Crawling the base URL only.",
                base_url
            ),
            CrawlDecision::NothingAllowed { discovered } => format!(
                "All {} discovered URLs are disallowed by robots.txt. Nothing to crawl.",
                discovered
            ),
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Normalized site address
    pub base_url: String,
    /// Sitemap the URLs came from (the guessed one when none was found)
    pub sitemap_url: String,
    /// Number of URLs the sitemap resolution produced
    pub discovered: usize,
    /// URLs dropped because robots.txt disallows them
    pub disallowed: usize,
    pub decision: CrawlDecision,
    /// Where the discovered-URL manifest was stored, when one was written
    pub manifest_location: Option<String>,
    pub statistics: RunStatistics,
    pub log_path: PathBuf,
    /// Time spent resolving the sitemap
    pub sitemap_check: Duration,
}

/// robots.txt rules applied to discovered URLs
#[derive(Debug, Clone)]
struct RobotsFilter {
    client: Client,
    user_agent: String,
}

/// Drives a complete run for one site
pub struct RunDriver {
    resolver: SitemapResolver,
    orchestrator: CrawlOrchestrator,
    sink: Arc<dyn PageSink>,
    log_dir: PathBuf,
    config_hash: Option<String>,
    robots_filter: Option<RobotsFilter>,
}

impl RunDriver {
    /// Assembles a driver from already-built parts
    ///
    /// `sink` should be the same sink the orchestrator writes pages to; it
    /// also receives the manifest.
    pub fn new(
        resolver: SitemapResolver,
        orchestrator: CrawlOrchestrator,
        sink: Arc<dyn PageSink>,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver,
            orchestrator,
            sink,
            log_dir: log_dir.into(),
            config_hash: None,
            robots_filter: None,
        }
    }

    /// Builds the HTTP client, sink, resolver and orchestrator from `config`
    ///
    /// # Returns
    ///
    /// * `Ok(RunDriver)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client or the sink could not be created
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.http)?;
        let sink = open_sink(&config.output)?;
        tracing::info!("Crawled content will be saved to: {}", sink.location());

        let resolver = SitemapResolver::from_config(client.clone(), &config.sitemap);
        let orchestrator = CrawlOrchestrator::new(
            Arc::new(HttpFetchClient::new(client.clone())),
            Arc::clone(&sink),
            CrawlSettings::from_config(&config.crawler),
        );

        let mut driver = Self::new(resolver, orchestrator, sink, &config.output.log_dir);
        if config.sitemap.respect_robots {
            driver = driver.with_robots_filter(client, &config.http.user_agent);
        }
        Ok(driver)
    }

    /// Records the configuration file hash in the run log
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Drops discovered URLs that robots.txt disallows for `user_agent`
    ///
    /// `user_agent` may be the full request header; rules are looked up by
    /// its product token.
    pub fn with_robots_filter(mut self, client: Client, user_agent: &str) -> Self {
        self.robots_filter = Some(RobotsFilter {
            client,
            user_agent: user_agent.to_string(),
        });
        self
    }

    /// Stops the crawl stage when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.orchestrator = self.orchestrator.with_cancellation(cancel);
        self
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Performs one run for `site_url`
    ///
    /// Sitemap and per-URL failures never abort the run; only failures to
    /// create or write the run log are returned as errors.
    pub async fn run(
        &self,
        site_url: &str,
        selection: CrawlSelection,
    ) -> Result<RunReport, HarvestError> {
        let process_started_at = Local::now();
        let process_clock = Instant::now();
        let base_url = normalize_site_url(site_url);

        let mut log = RunLog::create(&self.log_dir, process_started_at)?;
        tracing::info!("Processing URL: {}", base_url);
        tracing::info!("Log will be saved to: {}", log.path().display());

        log.line(format_args!("Crawl Log for {}", base_url))?;
        log.line(format_args!(
            "Started at: {}",
            process_started_at.format(DISPLAY_TIMESTAMP_FORMAT)
        ))?;
        if let Some(hash) = &self.config_hash {
            log.line(format_args!("Config hash: {}", hash))?;
        }
        log.blank()?;

        let sitemap_clock = Instant::now();
        let resolution = self.resolver.resolve(site_url).await;
        let sitemap_check = sitemap_clock.elapsed();
        log.line(format_args!(
            "Sitemap check completed in: {}",
            format_duration(sitemap_check)
        ))?;

        let discovered = resolution.urls.len();
        let mut disallowed = 0;
        let mut manifest_location = None;

        let (targets, decision) = if resolution.is_empty() {
            (vec![base_url.clone()], CrawlDecision::BaseOnly)
        } else {
            tracing::info!(
                "Found {} URLs in sitemap: {}",
                discovered,
                resolution.sitemap_url
            );
            log.line(format_args!(
                "Found {} URLs in sitemap: {}",
                discovered, resolution.sitemap_url
            ))?;
            log.blank()?;

            let manifest = SitemapManifest::new(
                base_url.as_str(),
                resolution.sitemap_url.as_str(),
                resolution.urls.clone(),
            );
            match self.sink.store_manifest(&manifest) {
                Ok(location) => {
                    log.line(format_args!("Saved sitemap links to: {}", location))?;
                    manifest_location = Some(location);
                }
                Err(e) => {
                    tracing::warn!("Failed to save sitemap links: {}", e);
                    log.line(format_args!("Failed to save sitemap links: {}", e))?;
                }
            }
            log.blank()?;

            let mut urls = resolution.urls.clone();
            if let Some(filter) = &self.robots_filter {
                let before = urls.len();
                let robots = load_robots(filter, &base_url).await;
                urls.retain(|url| robots.is_allowed(url, &filter.user_agent));
                disallowed = before - urls.len();
                if disallowed > 0 {
                    tracing::info!("Skipping {} URLs disallowed by robots.txt", disallowed);
                    log.line(format_args!(
                        "Skipped {} URLs disallowed by robots.txt",
                        disallowed
                    ))?;
                }
            }

            if urls.is_empty() {
                (urls, CrawlDecision::NothingAllowed { discovered })
            } else {
                selection.apply(urls)
            }
        };

        let description = decision.describe(&base_url);
        tracing::info!("{}", description);
        log.line(&description)?;

        let statistics = self.orchestrator.run(&targets).await;
        log.write_statistics(&statistics)?;

        let process_finished_at = Local::now();
        let process_elapsed = process_clock.elapsed();
        log.write_process_totals(process_started_at, process_finished_at, process_elapsed)?;

        tracing::info!("Crawling complete. Content saved to: {}", self.sink.location());
        tracing::info!("Crawl log saved to: {}", log.path().display());
        tracing::info!("Total process time: {}", format_duration(process_elapsed));

        Ok(RunReport {
            base_url,
            sitemap_url: resolution.sitemap_url,
            discovered,
            disallowed,
            decision,
            manifest_location,
            statistics,
            log_path: log.path().to_path_buf(),
            sitemap_check,
        })
    }
}

/// Fetches robots.txt, allowing everything when it is unavailable
async fn load_robots(filter: &RobotsFilter, base_url: &str) -> ParsedRobots {
    match fetch_robots(&filter.client, base_url).await {
        Ok(robots) => robots,
        Err(e) => {
            tracing::warn!("robots.txt unavailable, not filtering: {}", e);
            ParsedRobots::allow_all()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovered(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("https://a.test/{}", i)).collect()
    }

    #[test]
    fn test_select_all() {
        let (urls, decision) = CrawlSelection::All.apply(discovered(3));
        assert_eq!(urls.len(), 3);
        assert_eq!(decision, CrawlDecision::All { count: 3 });
    }

    #[test]
    fn test_select_prefix() {
        let (urls, decision) = CrawlSelection::Limit(2).apply(discovered(5));
        assert_eq!(urls, vec!["https://a.test/1", "https://a.test/2"]);
        assert_eq!(
            decision,
            CrawlDecision::Subset {
                selected: 2,
                discovered: 5
            }
        );
    }

    #[test]
    fn test_limit_zero_selects_one() {
        let (urls, decision) = CrawlSelection::Limit(0).apply(discovered(4));
        assert_eq!(urls, vec!["https://a.test/1"]);
        assert_eq!(
            decision,
            CrawlDecision::Subset {
                selected: 1,
                discovered: 4
            }
        );
    }

    #[test]
    fn test_limit_beyond_list_selects_all() {
        let (urls, decision) = CrawlSelection::Limit(50).apply(discovered(4));
        assert_eq!(urls.len(), 4);
        assert_eq!(decision, CrawlDecision::All { count: 4 });
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            CrawlDecision::All { count: 7 }.describe("https://a.test"),
            "Crawling all 7 URLs..."
        );
        assert_eq!(
            CrawlDecision::Subset {
                selected: 2,
                discovered: 9
            }
            .describe("https://a.test"),
            "Crawling 2 of 9 URLs..."
        );
        assert_eq!(
            CrawlDecision::BaseOnly.describe("https://a.test"),
            "No sitemap found or empty sitemap for https://a.test. Crawling the base URL only."
        );
        assert_eq!(
            CrawlDecision::NothingAllowed { discovered: 4 }.describe("https://a.test"),
            "All 4 discovered URLs are disallowed by robots.txt. Nothing to crawl."
        );
    }
}
