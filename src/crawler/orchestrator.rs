//! Bounded-concurrency crawl orchestration
//!
//! One task is spawned per URL. A counting semaphore admits at most
//! `max_concurrent` of them into the fetch stage at a time; each admitted
//! task runs its fetch through the retry policy, hands successful content to
//! the page sink and emits exactly one [`CrawlOutcome`]. Outcomes travel over
//! a channel to a single aggregation loop that owns every counter.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::FetchClient;
use crate::crawler::retry::{PageFetchError, RetryPolicy};
use crate::output::{ProgressTracker, RunStatistics};
use crate::storage::{PageRecord, PageSink};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Terminal result for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Fetched and persisted
    Succeeded {
        url: String,
        attempts: u32,
        /// Where the sink stored the page
        location: String,
    },
    /// Retries exhausted, or the fetched content could not be persisted
    Failed { url: String, reason: String },
    /// Never completed because the run was cancelled
    Cancelled { url: String },
}

impl CrawlOutcome {
    pub fn url(&self) -> &str {
        match self {
            CrawlOutcome::Succeeded { url, .. }
            | CrawlOutcome::Failed { url, .. }
            | CrawlOutcome::Cancelled { url } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CrawlOutcome::Succeeded { .. })
    }
}

/// Tuning for one orchestrated run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Upper bound on simultaneously in-flight URLs (at least 1)
    pub max_concurrent: usize,
    pub retry: RetryPolicy,
    /// Session identifier passed to the fetch client on every call
    pub session_id: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

impl CrawlSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent as usize,
            retry: RetryPolicy::from_config(config),
            session_id: config.session_id.clone(),
        }
    }
}

/// Everything a crawl task needs, shared by all tasks of a run
struct TaskContext {
    client: Arc<dyn FetchClient>,
    sink: Arc<dyn PageSink>,
    retry: RetryPolicy,
    session_id: String,
    gate: Arc<Semaphore>,
    cancel: CancellationToken,
}

/// Sends a task's outcome, or a failure if the task ends without one
///
/// Guarantees one outcome per URL even when a task panics.
struct OutcomeReporter {
    url: Option<String>,
    tx: mpsc::UnboundedSender<CrawlOutcome>,
}

impl OutcomeReporter {
    fn report(mut self, outcome: CrawlOutcome) {
        self.url = None;
        let _ = self.tx.send(outcome);
    }
}

impl Drop for OutcomeReporter {
    fn drop(&mut self) {
        if let Some(url) = self.url.take() {
            let _ = self.tx.send(CrawlOutcome::Failed {
                url,
                reason: "crawl task ended without a result".to_string(),
            });
        }
    }
}

/// Fans a URL list out over a bounded pool of fetch tasks
pub struct CrawlOrchestrator {
    client: Arc<dyn FetchClient>,
    sink: Arc<dyn PageSink>,
    settings: CrawlSettings,
    cancel: CancellationToken,
}

impl CrawlOrchestrator {
    pub fn new(
        client: Arc<dyn FetchClient>,
        sink: Arc<dyn PageSink>,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            client,
            sink,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to stop the run early
    ///
    /// Cancellation is checked while waiting for a concurrency slot and
    /// between retry attempts; fetches already in progress complete.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawls every URL and returns the run's statistics
    ///
    /// Never fails as a whole: each URL ends as processed, failed or
    /// cancelled, and `processed + failed + cancelled == urls.len()`.
    /// Completion order across URLs is unspecified.
    pub async fn run(&self, urls: &[String]) -> RunStatistics {
        let mut tracker = ProgressTracker::start(urls.len());
        if urls.is_empty() {
            tracing::info!("No URLs to crawl");
            return tracker.finish();
        }

        let max_concurrent = self.settings.max_concurrent.max(1);
        tracing::info!(
            "Crawling {} URLs with up to {} concurrent fetches",
            urls.len(),
            max_concurrent
        );

        let context = Arc::new(TaskContext {
            client: Arc::clone(&self.client),
            sink: Arc::clone(&self.sink),
            retry: self.settings.retry,
            session_id: self.settings.session_id.clone(),
            gate: Arc::new(Semaphore::new(max_concurrent)),
            cancel: self.cancel.clone(),
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();

        for url in urls {
            let reporter = OutcomeReporter {
                url: Some(url.clone()),
                tx: tx.clone(),
            };
            let context = Arc::clone(&context);
            let url = url.clone();

            tasks.spawn(async move {
                let outcome = crawl_url(&context, url).await;
                reporter.report(outcome);
            });
        }
        drop(tx);

        while let Some(outcome) = rx.recv().await {
            tracker.record(&outcome);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl task did not finish cleanly: {}", e);
            }
        }

        let stats = tracker.finish();
        stats.log_summary();
        stats
    }
}

/// Runs one URL from gate admission to its terminal outcome
async fn crawl_url(context: &TaskContext, url: String) -> CrawlOutcome {
    let _permit = tokio::select! {
        biased;
        _ = context.cancel.cancelled() => return CrawlOutcome::Cancelled { url },
        permit = Arc::clone(&context.gate).acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return CrawlOutcome::Cancelled { url },
        },
    };

    tracing::debug!("Fetching {}", url);
    let fetched = context
        .retry
        .run(&url, &context.cancel, |attempt| {
            tracing::debug!(attempt, "Attempting {}", url);
            context.client.fetch(&url, &context.session_id)
        })
        .await;

    let page = match fetched {
        Ok(page) => page,
        Err(PageFetchError::Cancelled { .. }) => return CrawlOutcome::Cancelled { url },
        Err(e) => {
            return CrawlOutcome::Failed {
                reason: e.to_string(),
                url,
            }
        }
    };

    let record =
        PageRecord::new(url.as_str(), page.response.content).with_title(page.response.title);
    let sink = Arc::clone(&context.sink);
    let stored = tokio::task::spawn_blocking(move || sink.store_page(&record))
        .await
        .map_err(|e| e.to_string())
        .and_then(|result| result.map_err(|e| e.to_string()));

    match stored {
        Ok(location) => CrawlOutcome::Succeeded {
            url,
            attempts: page.attempts,
            location,
        },
        Err(e) => {
            tracing::error!("Failed to persist {}: {}", url, e);
            CrawlOutcome::Failed {
                reason: format!("Failed to persist content: {}", e),
                url,
            }
        }
    }
}
