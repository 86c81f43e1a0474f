use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::StoredNewsRecord;

const SCHEMA_SQL: &str = include_str!("../schema.sql");

/// Gateway to the `news_urls` table.
///
/// Every call opens its own connection and drops it before returning, on
/// success and on error alike. Nothing is pooled or batched across calls.
pub struct NewsStore {
    path: PathBuf,
}

impl NewsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        NewsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path)
            .with_context(|| format!("Failed to open DB at {}", self.path.display()))
    }

    pub fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA_SQL).context("Failed to initialize schema")?;
        Ok(())
    }

    /// Connection check, returns the SQLite library version.
    pub fn ping(&self) -> Result<String> {
        let conn = self.connect()?;
        let version = conn.query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
        Ok(version)
    }

    pub fn insert(&self, title: &str, url: &str) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO news_urls (title, url) VALUES (?, ?)",
            params![title, url],
        )
        .with_context(|| format!("Failed to insert news '{title}'"))?;

        Ok(conn.last_insert_rowid())
    }

    pub fn fetch_by_id(&self, id: i64) -> Result<Option<StoredNewsRecord>> {
        let conn = self.connect()?;
        let record = conn
            .query_row(
                "SELECT id, title, url FROM news_urls WHERE id = ?",
                [id],
                |row| {
                    Ok(StoredNewsRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        url: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn fetch_all(&self) -> Result<Vec<StoredNewsRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, title, url FROM news_urls ORDER BY id")?;

        let iter = stmt.query_map([], |row| {
            Ok(StoredNewsRecord {
                id: row.get(0)?,
                title: row.get(1)?,
                url: row.get(2)?,
            })
        })?;

        Ok(iter.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Rewrites the url of every row carrying `title`; returns how many changed.
    pub fn update_url_by_title(&self, title: &str, new_url: &str) -> Result<usize> {
        let conn = self.connect()?;
        let changed = conn
            .execute(
                "UPDATE news_urls SET url = ? WHERE title = ?",
                params![new_url, title],
            )
            .with_context(|| format!("Failed to update URL for '{title}'"))?;
        Ok(changed)
    }

    pub fn delete_by_title(&self, title: &str) -> Result<usize> {
        let conn = self.connect()?;
        let deleted = conn
            .execute("DELETE FROM news_urls WHERE title = ?", [title])
            .with_context(|| format!("Failed to delete news '{title}'"))?;
        Ok(deleted)
    }
}
