//! Run statistics and the arithmetic behind progress reporting
//!
//! This module holds the final statistics record of a crawl and the helpers
//! used to derive percentages, ETA, averages and throughput from it.

use chrono::{DateTime, Local};
use std::time::Duration;

/// Aggregate counters for one crawl run
///
/// Built by a single aggregation point and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    /// Number of URLs handed to the orchestrator
    pub total: usize,

    /// URLs fetched and persisted
    pub processed: usize,

    /// URLs that exhausted their retries or could not be persisted
    pub failed: usize,

    /// URLs never completed because the run was cancelled
    pub cancelled: usize,

    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,

    /// Monotonic wall time between start and finish
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Statistics for a run over zero URLs
    pub fn empty() -> Self {
        let now = Local::now();
        Self {
            total: 0,
            processed: 0,
            failed: 0,
            cancelled: 0,
            started_at: now,
            finished_at: now,
            elapsed: Duration::ZERO,
        }
    }

    /// Whether every URL reached exactly one terminal state
    pub fn is_accounted(&self) -> bool {
        self.processed + self.failed + self.cancelled == self.total
    }

    /// Mean wall time per processed URL, `None` when nothing was processed
    pub fn average_per_url(&self) -> Option<Duration> {
        if self.processed == 0 {
            return None;
        }
        Some(self.elapsed.div_f64(self.processed as f64))
    }

    /// Processed URLs per minute, `None` when nothing was processed or no
    /// time elapsed
    pub fn urls_per_minute(&self) -> Option<f64> {
        let seconds = self.elapsed.as_secs_f64();
        if self.processed == 0 || seconds <= 0.0 {
            return None;
        }
        Some(self.processed as f64 / seconds * 60.0)
    }

    /// Logs the end-of-run summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Completed crawling {} out of {} URLs",
            self.processed,
            self.total
        );
        tracing::info!("Failed to crawl {} URLs", self.failed);
        if self.cancelled > 0 {
            tracing::info!("Cancelled before completion: {} URLs", self.cancelled);
        }
        tracing::info!(
            "Crawling started at: {}",
            self.started_at.format(super::DISPLAY_TIMESTAMP_FORMAT)
        );
        tracing::info!(
            "Crawling finished at: {}",
            self.finished_at.format(super::DISPLAY_TIMESTAMP_FORMAT)
        );
        tracing::info!("Total crawling time: {}", format_duration(self.elapsed));
        if let Some(average) = self.average_per_url() {
            tracing::info!("Average time per URL: {}", format_duration(average));
        }
        if let Some(rate) = self.urls_per_minute() {
            tracing::info!("URLs crawled per minute: {:.2}", rate);
        }
    }
}

/// Estimated time remaining: `elapsed / processed * (total - processed)`
///
/// `None` when nothing has been processed yet.
pub fn eta(elapsed: Duration, processed: usize, total: usize) -> Option<Duration> {
    if processed == 0 {
        return None;
    }
    let remaining = total.saturating_sub(processed);
    Some(elapsed.div_f64(processed as f64).mul_f64(remaining as f64))
}

/// Share of `total` already processed, in percent
pub fn percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    processed as f64 / total as f64 * 100.0
}

/// Formats a duration as `H:MM:SS`, dropping fractional seconds
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sitemap_harvest::output::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(3_723_900)), "1:02:03");
/// assert_eq!(format_duration(Duration::ZERO), "0:00:00");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
