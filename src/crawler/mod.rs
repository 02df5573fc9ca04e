//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP client construction and plain text fetches
//! - The fetch client contract and its HTTP implementation
//! - Fixed-delay retry handling per URL
//! - Bounded-concurrency orchestration with progress accounting

mod fetcher;
mod orchestrator;
mod retry;

pub use fetcher::{
    build_http_client, fetch_text, FetchClient, FetchError, FetchResponse, HttpFetchClient,
};
pub use orchestrator::{CrawlOrchestrator, CrawlOutcome, CrawlSettings};
pub use retry::{FetchedPage, PageFetchError, RetryPolicy};
