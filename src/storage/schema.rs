//! Database schema definitions
//!
//! This module contains the SQL schema for the SQLite page sink.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Fetched pages, one row per successful fetch
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    title TEXT,
    content TEXT NOT NULL,
    fetched_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_url ON pages(url);

-- Sitemap discovery results
CREATE TABLE IF NOT EXISTS manifests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    base_url TEXT NOT NULL,
    sitemap_url TEXT NOT NULL,
    discovered_at TEXT NOT NULL,
    total_urls INTEGER NOT NULL
);

-- Discovered URLs in document order
CREATE TABLE IF NOT EXISTS manifest_entries (
    manifest_id INTEGER NOT NULL REFERENCES manifests(id),
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    PRIMARY KEY (manifest_id, position)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
