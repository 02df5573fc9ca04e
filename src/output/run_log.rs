//! Plain-text run log
//!
//! Every line is flushed as soon as it is written, so a run that dies
//! midway still leaves a readable log behind.

use crate::output::stats::{format_duration, RunStatistics};
use crate::output::{DISPLAY_TIMESTAMP_FORMAT, FILE_TIMESTAMP_FORMAT};
use crate::storage::create_unique_file;
use chrono::{DateTime, Local};
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Incrementally written log of one run
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RunLog {
    /// Creates `crawl_log_{timestamp}.txt` inside `dir`
    ///
    /// The directory is created when missing; an existing log is never
    /// overwritten.
    pub fn create(dir: &Path, started_at: DateTime<Local>) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let stem = format!("crawl_log_{}", started_at.format(FILE_TIMESTAMP_FORMAT));
        let (file, path) = create_unique_file(dir, &stem, "txt")?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line and flushes it
    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.writer, "{}", text)?;
        self.writer.flush()
    }

    pub fn blank(&mut self) -> io::Result<()> {
        self.line("")
    }

    /// Writes the `--- Crawl Statistics ---` section
    pub fn write_statistics(&mut self, stats: &RunStatistics) -> io::Result<()> {
        self.blank()?;
        self.line("--- Crawl Statistics ---")?;
        self.line(format_args!(
            "Crawling started at: {}",
            stats.started_at.format(DISPLAY_TIMESTAMP_FORMAT)
        ))?;
        self.line(format_args!(
            "Crawling finished at: {}",
            stats.finished_at.format(DISPLAY_TIMESTAMP_FORMAT)
        ))?;
        self.line(format_args!(
            "Total crawling time: {}",
            format_duration(stats.elapsed)
        ))?;
        self.line(format_args!("Successfully crawled URLs: {}", stats.processed))?;
        self.line(format_args!("Failed URLs: {}", stats.failed))?;
        self.line(format_args!("Cancelled URLs: {}", stats.cancelled))?;

        if let Some(average) = stats.average_per_url() {
            self.line(format_args!(
                "Average time per URL: {}",
                format_duration(average)
            ))?;
        }
        if let Some(rate) = stats.urls_per_minute() {
            self.line(format_args!("URLs crawled per minute: {:.2}", rate))?;
        }

        Ok(())
    }

    /// Writes the `--- Total Process Statistics ---` section
    pub fn write_process_totals(
        &mut self,
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
        elapsed: Duration,
    ) -> io::Result<()> {
        self.blank()?;
        self.line("--- Total Process Statistics ---")?;
        self.line(format_args!(
            "Process started at: {}",
            started_at.format(DISPLAY_TIMESTAMP_FORMAT)
        ))?;
        self.line(format_args!(
            "Process finished at: {}",
            finished_at.format(DISPLAY_TIMESTAMP_FORMAT)
        ))?;
        self.line(format_args!(
            "Total process time: {}",
            format_duration(elapsed)
        ))
    }
}
