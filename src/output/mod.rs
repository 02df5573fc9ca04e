//! Output module for progress reporting, statistics and run records
//!
//! This module handles:
//! - Running progress and ETA reporting during a crawl
//! - Final run statistics and their derived rates
//! - Markdown rendering of pages and discovery manifests
//! - The plain-text run log

mod markdown;
mod progress;
mod run_log;
pub mod stats;

pub use markdown::{format_manifest, format_page_document};
pub use progress::ProgressTracker;
pub use run_log::RunLog;
pub use stats::{eta, format_duration, percent, RunStatistics};

/// Timestamp embedded in generated file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp shown inside generated documents and logs
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
