//! Sitemap Harvest: sitemap-driven site crawler
//!
//! This crate discovers every page a website lists in its sitemap (following
//! sitemap indexes and the robots.txt `Sitemap:` directive), then fetches and
//! stores each page under a bounded worker pool with per-URL retries and
//! aggregate progress reporting.

pub mod config;
pub mod crawler;
pub mod driver;
pub mod output;
pub mod robots;
pub mod sitemap;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Errors raised while retrieving or reading a sitemap or robots.txt
///
/// These never abort a resolution: the resolver logs them where they occur
/// and the affected branch contributes no URLs.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse sitemap {url}: {source}")]
    Parse {
        url: String,
        source: sitemap::DocumentError,
    },
}

/// Result type alias for Sitemap Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOrchestrator, CrawlOutcome, FetchClient, RetryPolicy};
pub use driver::{CrawlDecision, CrawlSelection, RunDriver, RunReport};
pub use output::RunStatistics;
pub use sitemap::{Resolution, SitemapResolver};
pub use storage::PageSink;
