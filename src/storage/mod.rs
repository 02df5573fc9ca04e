//! Storage module for persisting crawl output
//!
//! This module handles everything written as the result of a crawl:
//! - One document per successfully fetched page
//! - The manifest of URLs a sitemap resolution discovered
//! - Markdown directory and SQLite backends behind a common sink trait

mod markdown_dir;
mod schema;
mod sqlite;
mod traits;

pub(crate) use markdown_dir::create_unique_file;
pub use markdown_dir::MarkdownDirSink;
pub use sqlite::SqliteSink;
pub use traits::{PageRecord, PageSink, SitemapManifest, StorageError, StorageResult};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;
use std::sync::Arc;

/// Opens the sink selected by the output configuration
///
/// Directory creation happens here, as part of sink construction.
///
/// # Arguments
///
/// * `config` - The output configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn PageSink>)` - Ready-to-use sink
/// * `Err(StorageError)` - The directory or database could not be created
pub fn open_sink(config: &OutputConfig) -> StorageResult<Arc<dyn PageSink>> {
    match config.format {
        OutputFormat::Markdown => Ok(Arc::new(MarkdownDirSink::new(&config.content_dir)?)),
        OutputFormat::Sqlite => Ok(Arc::new(SqliteSink::new(Path::new(&config.database_path))?)),
    }
}
