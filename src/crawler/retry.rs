//! Retry logic with a fixed delay
//!
//! Every URL gets a bounded number of sequential fetch attempts. A reported
//! failure and a raised fetch error are handled alike: wait the fixed delay,
//! then try again, until an attempt succeeds or the attempts run out.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchError, FetchResponse};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Terminal failure for one URL
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageFetchError {
    #[error("{url} failed after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("{url} cancelled after {attempts} attempts")]
    Cancelled { url: String, attempts: u32 },
}

/// Successful fetch together with the number of attempts it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub response: FetchResponse,
    pub attempts: u32,
}

/// Bounded retries with a fixed (non-exponential) delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` below 1 is raised to 1
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_delay_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `attempt` until it succeeds or the attempts are used up
    ///
    /// `attempt` receives the 1-based attempt number. Attempts are strictly
    /// sequential. Cancellation is observed only between attempts: an
    /// attempt already running always completes.
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - The first successful response
    /// * `Err(PageFetchError::Exhausted)` - Every attempt failed; carries the last error
    /// * `Err(PageFetchError::Cancelled)` - The run was cancelled while waiting to retry
    pub async fn run<F, Fut>(
        &self,
        url: &str,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> Result<FetchedPage, PageFetchError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<FetchResponse, FetchError>>,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            let last_error = match attempt(attempts).await {
                Ok(response) if response.success => {
                    if attempts > 1 {
                        tracing::info!(url, attempts, "Fetch succeeded after retry");
                    }
                    return Ok(FetchedPage { response, attempts });
                }
                Ok(response) => response
                    .error_message
                    .unwrap_or_else(|| "Unknown error".to_string()),
                Err(e) => e.to_string(),
            };

            if attempts >= self.max_attempts {
                tracing::error!(
                    url,
                    attempts,
                    error = %last_error,
                    "Failed to fetch after all retry attempts"
                );
                return Err(PageFetchError::Exhausted {
                    url: url.to_string(),
                    attempts,
                    last_error,
                });
            }

            tracing::warn!(
                url,
                attempt = attempts,
                max_attempts = self.max_attempts,
                delay_ms = self.delay.as_millis() as u64,
                error = %last_error,
                "Fetch failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(PageFetchError::Cancelled {
                        url: url.to_string(),
                        attempts,
                    });
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }
}
