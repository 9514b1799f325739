use std::path::{Path, PathBuf};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Fixed key of the single cache row, matching what earlier deployments of
/// this system stored their entry under.
const CACHE_ENTRY_NAME: &str = "cachedDatabase";
const CACHE_FILE_NAME: &str = "player_statistics_cache.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CacheEntry {
    pub snapshot: Vec<u8>,
    pub cached_at: DateTime<Utc>,
}

/// Durable single-entry store for the most recently downloaded snapshot.
///
/// Lives in one SQLite file under the configured cache directory. A `put`
/// replaces the whole entry atomically; readers never observe a partial
/// snapshot. The store is strictly best-effort: any read failure degrades to
/// "no cached entry" so the caller falls back to a fresh download.
#[derive(Debug, Clone)]
pub(crate) struct SnapshotCacheStore {
    db_path: PathBuf,
}

impl SnapshotCacheStore {
    pub(crate) fn new(cache_directory: impl AsRef<Path>) -> Self {
        Self {
            db_path: cache_directory.as_ref().join(CACHE_FILE_NAME),
        }
    }

    fn open(&self) -> anyhow::Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshot_cache (
                entry_name TEXT PRIMARY KEY,
                snapshot BLOB NOT NULL,
                cached_at_ms INTEGER NOT NULL
             )",
            [],
        )?;
        Ok(conn)
    }

    pub(crate) fn put(&self, snapshot: &[u8], cached_at: DateTime<Utc>) -> anyhow::Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT OR REPLACE INTO snapshot_cache (entry_name, snapshot, cached_at_ms)
             VALUES (?1, ?2, ?3)",
            params![CACHE_ENTRY_NAME, snapshot, cached_at.timestamp_millis()],
        )?;
        Ok(())
    }

    /// Reads the cached entry. Store failures are logged and reported as an
    /// absent entry, never propagated.
    pub(crate) fn get(&self) -> Option<CacheEntry> {
        match self.read_entry() {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "snapshot cache read failed, treating cache as empty");
                None
            }
        }
    }

    fn read_entry(&self) -> anyhow::Result<Option<CacheEntry>> {
        // Do not create the store on the read path.
        if !self.db_path.exists() {
            return Ok(None);
        }

        let conn = self.open()?;
        let row = conn
            .query_row(
                "SELECT snapshot, cached_at_ms FROM snapshot_cache WHERE entry_name = ?1",
                params![CACHE_ENTRY_NAME],
                |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match row {
            Some((snapshot, cached_at_ms)) => {
                let cached_at = DateTime::from_timestamp_millis(cached_at_ms)
                    .ok_or_else(|| anyhow!("cache timestamp out of range: {cached_at_ms}"))?;
                Ok(Some(CacheEntry {
                    snapshot,
                    cached_at,
                }))
            }
            None => Ok(None),
        }
    }
}
