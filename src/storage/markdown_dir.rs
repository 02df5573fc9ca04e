//! Markdown directory sink
//!
//! Writes one Markdown file per page and one per discovery manifest into a
//! single content directory.

use crate::output::{format_manifest, format_page_document, FILE_TIMESTAMP_FORMAT};
use crate::storage::traits::{PageRecord, PageSink, SitemapManifest, StorageResult};
use crate::url::{extract_host, file_stem, sanitize_file_name};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Highest numeric suffix tried before giving up on a file name
const MAX_NAME_SUFFIX: u32 = 1000;

/// Sink writing Markdown files into a content directory
#[derive(Debug, Clone)]
pub struct MarkdownDirSink {
    dir: PathBuf,
}

impl MarkdownDirSink {
    /// Creates the sink, creating `dir` (and parents) if needed
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PageSink for MarkdownDirSink {
    fn store_page(&self, page: &PageRecord) -> StorageResult<String> {
        let stem = format!(
            "{}_{}",
            file_stem(&page.url),
            page.fetched_at.format(FILE_TIMESTAMP_FORMAT)
        );
        let path = write_new_file(&self.dir, &stem, &format_page_document(page))?;
        tracing::debug!("Saved markdown file: {}", path.display());
        Ok(path.display().to_string())
    }

    fn store_manifest(&self, manifest: &SitemapManifest) -> StorageResult<String> {
        let host = extract_host(&manifest.base_url).unwrap_or_else(|| "site".to_string());
        let stem = format!(
            "{}_{}",
            sanitize_file_name(&format!("{}_sitemap_links", host)),
            manifest.discovered_at.format(FILE_TIMESTAMP_FORMAT)
        );
        let path = write_new_file(&self.dir, &stem, &format_manifest(manifest))?;
        tracing::info!("Saved sitemap links to markdown file: {}", path.display());
        Ok(path.display().to_string())
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Writes `contents` to `{stem}.md`, or `{stem}_{n}.md` when taken
fn write_new_file(dir: &Path, stem: &str, contents: &str) -> StorageResult<PathBuf> {
    let (file, path) = create_unique_file(dir, stem, "md")?;
    fill_or_remove(file, &path, contents.as_bytes())?;
    Ok(path)
}

/// Writes `contents` through `writer`, deleting `path` if the write fails
fn fill_or_remove<W: Write>(mut writer: W, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let written = writer.write_all(contents).and_then(|_| writer.flush());
    if let Err(e) = written {
        drop(writer);
        if let Err(remove_err) = std::fs::remove_file(path) {
            tracing::warn!(
                "Failed to remove partial file {}: {}",
                path.display(),
                remove_err
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Creates `{stem}.{extension}` in `dir`, adding `_1`, `_2`, ... when taken
///
/// Files are opened with `create_new`, so concurrent writers never share a
/// name and existing files are never overwritten.
pub(crate) fn create_unique_file(
    dir: &Path,
    stem: &str,
    extension: &str,
) -> std::io::Result<(File, PathBuf)> {
    for suffix in 0..=MAX_NAME_SUFFIX {
        let name = if suffix == 0 {
            format!("{}.{}", stem, extension)
        } else {
            format!("{}_{}.{}", stem, suffix, extension)
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free file name for {} in {}", stem, dir.display()),
    ))
}
