use serde::Deserialize;

/// Main configuration structure for Sitemap Harvest
///
/// Every section and key is optional; missing values fall back to the
/// defaults below so a run works without any configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub sitemap: SitemapConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Crawl pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of URLs fetched at the same time
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: u32,

    /// Total fetch attempts per URL before it is counted as failed
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Fixed wait between two attempts for the same URL (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Session identifier handed to the fetch client on every call
    #[serde(rename = "session-id")]
    pub session_id: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            max_retries: 3,
            retry_delay_ms: 2000,
            session_id: "session1".to_string(),
        }
    }
}

/// Sitemap discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Deepest sitemap-index nesting followed before giving up on a branch
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Drop discovered URLs that robots.txt disallows for our user agent
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            respect_robots: false,
        }
    }
}

/// Request identification sent with every HTTP request
///
/// Many servers reject clients that do not look like a browser, so the
/// defaults mirror a desktop Chrome request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Where fetched pages are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One Markdown file per page inside `content-dir`
    #[default]
    Markdown,
    /// A single SQLite database at `database-path`
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Directory receiving page files and the sitemap manifest
    #[serde(rename = "content-dir")]
    pub content_dir: String,

    /// Directory receiving run logs
    #[serde(rename = "log-dir")]
    pub log_dir: String,

    /// Path to the SQLite database file (sqlite format only)
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            content_dir: "crawled_content".to_string(),
            log_dir: "crawl_logs".to_string(),
            database_path: "crawled_content/pages.db".to_string(),
        }
    }
}
