//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests, including:
//! - Building HTTP clients with a browser-like header set
//! - Plain text retrieval for sitemaps and robots.txt
//! - The page fetch contract used by the crawl orchestrator
//! - Error classification

use crate::config::HttpConfig;
use crate::{HarvestError, SitemapError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;

/// Outcome of a single fetch attempt as reported by a fetch client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Whether the page was retrieved
    pub success: bool,
    /// Page content (empty on failure)
    pub content: String,
    /// Reason reported for an unsuccessful fetch
    pub error_message: Option<String>,
    /// Page title, when the client extracts one
    pub title: Option<String>,
}

impl FetchResponse {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            error_message: None,
            title: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            error_message: Some(message.into()),
            title: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

/// Errors raised by a fetch client instead of being reported as a failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request failed for {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Retrieves the content of one page
///
/// Implementations are shared by every in-flight task, so they must tolerate
/// as many concurrent calls as the orchestrator admits.
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// Fetches `url` within the logical browsing session `session_id`
    ///
    /// A reported failure (`success == false`) and a raised error are both
    /// treated as retryable by the caller.
    async fn fetch(&self, url: &str, session_id: &str) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - Request identification and timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(HarvestError)` - A header value was invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use sitemap_harvest::config::HttpConfig;
/// use sitemap_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_str(&config.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language)?,
    );

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches a URL and returns its body as text
///
/// Used for sitemap documents and robots.txt.
///
/// # Returns
///
/// * `Ok(String)` - The body of a 2xx response
/// * `Err(SitemapError::Status)` - The server answered with another status
/// * `Err(SitemapError::Fetch)` - The request or body transfer failed
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, SitemapError> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| SitemapError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SitemapError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| SitemapError::Fetch {
        url: url.to_string(),
        source,
    })
}

/// Fetch client that retrieves pages over plain HTTP
///
/// Returns the raw response body; no rendering or content extraction happens
/// beyond reading the HTML `<title>`.
#[derive(Debug, Clone)]
pub struct HttpFetchClient {
    client: Client,
}

impl HttpFetchClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchClient for HttpFetchClient {
    async fn fetch(&self, url: &str, session_id: &str) -> Result<FetchResponse, FetchError> {
        tracing::debug!(session = session_id, "GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(FetchResponse::failure(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let title = extract_title(&body);

        Ok(FetchResponse::success(body).with_title(title))
    }
}

/// Extracts the page title from an HTML document
fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
