//! Storage traits and error types
//!
//! This module defines the persistence sink interface shared by every storage
//! backend and its associated error types.

use chrono::{DateTime, Local};
use thiserror::Error;

/// Errors that can occur while persisting crawl output
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A fetched page ready to be persisted
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub url: String,
    pub content: String,
    pub title: Option<String>,
    pub fetched_at: DateTime<Local>,
}

impl PageRecord {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            title: None,
            fetched_at: Local::now(),
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

/// The full list of URLs a sitemap resolution discovered
#[derive(Debug, Clone)]
pub struct SitemapManifest {
    /// Normalized site address the resolution started from
    pub base_url: String,
    /// Sitemap the URLs were read from
    pub sitemap_url: String,
    /// Discovered page URLs in document order
    pub urls: Vec<String>,
    pub discovered_at: DateTime<Local>,
}

impl SitemapManifest {
    pub fn new(
        base_url: impl Into<String>,
        sitemap_url: impl Into<String>,
        urls: Vec<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            sitemap_url: sitemap_url.into(),
            urls,
            discovered_at: Local::now(),
        }
    }
}

/// Durable destination for fetched pages and discovery manifests
///
/// Implementations are shared by every crawl task and must tolerate
/// concurrent calls.
pub trait PageSink: Send + Sync {
    /// Persists one page
    ///
    /// # Returns
    ///
    /// A location string identifying where the page was written (a file
    /// path, or a database reference)
    fn store_page(&self, page: &PageRecord) -> StorageResult<String>;

    /// Persists the discovered-URL manifest, returning its location
    fn store_manifest(&self, manifest: &SitemapManifest) -> StorageResult<String>;

    /// Describes where this sink writes, for log output
    fn location(&self) -> String;
}
