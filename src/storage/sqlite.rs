//! SQLite page sink
//!
//! This module provides a SQLite-based implementation of the PageSink trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageRecord, PageSink, SitemapManifest, StorageError, StorageResult};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
///
/// A single connection is shared behind a mutex; writes are short and
/// serialized.
pub struct SqliteSink {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    ///
    /// The parent directory is created when missing.
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn reference(&self, table: &str, id: i64) -> String {
        format!("{}#{}/{}", self.path.display(), table, id)
    }
}

impl PageSink for SqliteSink {
    fn store_page(&self, page: &PageRecord) -> StorageResult<String> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO pages (url, title, content, fetched_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                page.url,
                page.title,
                page.content,
                page.fetched_at.to_rfc3339()
            ],
        )?;
        Ok(self.reference("pages", conn.last_insert_rowid()))
    }

    fn store_manifest(&self, manifest: &SitemapManifest) -> StorageResult<String> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO manifests (base_url, sitemap_url, discovered_at, total_urls)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                manifest.base_url,
                manifest.sitemap_url,
                manifest.discovered_at.to_rfc3339(),
                manifest.urls.len() as i64
            ],
        )?;
        let manifest_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO manifest_entries (manifest_id, position, url) VALUES (?1, ?2, ?3)",
            )?;
            for (position, url) in manifest.urls.iter().enumerate() {
                stmt.execute(params![manifest_id, position as i64 + 1, url])?;
            }
        }

        tx.commit()?;
        Ok(self.reference("manifests", manifest_id))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
