//! Running progress accounting for a crawl
//!
//! The tracker is owned by the orchestrator's single aggregation point, so
//! its counters never see concurrent writers.

use crate::crawler::CrawlOutcome;
use crate::output::stats::{eta, format_duration, percent, RunStatistics};
use chrono::{DateTime, Local};
use tokio::time::Instant;

/// Counts terminal outcomes and reports progress as they arrive
#[derive(Debug)]
pub struct ProgressTracker {
    total: usize,
    processed: usize,
    failed: usize,
    cancelled: usize,
    started_at: DateTime<Local>,
    started: Instant,
}

impl ProgressTracker {
    /// Starts the clock for a run over `total` URLs
    pub fn start(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            failed: 0,
            cancelled: 0,
            started_at: Local::now(),
            started: Instant::now(),
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    /// Number of URLs that reached a terminal state so far
    pub fn completed(&self) -> usize {
        self.processed + self.failed + self.cancelled
    }

    /// Records one terminal outcome and logs the matching progress line
    pub fn record(&mut self, outcome: &CrawlOutcome) {
        match outcome {
            CrawlOutcome::Succeeded { url, .. } => {
                self.processed += 1;
                self.report_success(url);
            }
            CrawlOutcome::Failed { url, reason } => {
                self.failed += 1;
                tracing::warn!("Failed to crawl {}: {}", url, reason);
            }
            CrawlOutcome::Cancelled { url } => {
                self.cancelled += 1;
                tracing::debug!("Cancelled before completion: {}", url);
            }
        }
    }

    fn report_success(&self, url: &str) {
        let elapsed = self.started.elapsed();
        let pct = percent(self.processed, self.total);

        match eta(elapsed, self.processed, self.total) {
            Some(remaining) => tracing::info!(
                "Successfully crawled: {} ({}/{}, {:.1}%) - Elapsed: {}, Est. remaining: {}",
                url,
                self.processed,
                self.total,
                pct,
                format_duration(elapsed),
                format_duration(remaining)
            ),
            None => tracing::info!(
                "Successfully crawled: {} ({}/{}, {:.1}%) - Elapsed: {}",
                url,
                self.processed,
                self.total,
                pct,
                format_duration(elapsed)
            ),
        }
    }

    /// Stops the clock and produces the final statistics
    pub fn finish(self) -> RunStatistics {
        RunStatistics {
            total: self.total,
            processed: self.processed,
            failed: self.failed,
            cancelled: self.cancelled,
            started_at: self.started_at,
            finished_at: Local::now(),
            elapsed: self.started.elapsed(),
        }
    }
}
