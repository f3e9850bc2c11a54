//! Entry CRUD operations.
//!
//! Provides functions for storing, reading, and purging cached collection
//! entries. Payloads are opaque JSON strings; freshness is decided by the
//! caller against the stored `fetched_at` timestamp.

use super::connection::CacheDb;
use crate::Error;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached collection entry.
///
/// Represents one fetched resource payload together with the metadata
/// needed to decide its freshness.
#[derive(Debug, Clone)]
pub struct Entry {
    pub key: String,
    pub resource: String,
    pub params_json: String,
    pub payload: String,
    pub fetched_at: String,
}

impl Entry {
    /// Age of this entry relative to now.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTimestamp` if the stored `fetched_at` is not
    /// RFC3339.
    pub fn age(&self) -> Result<Duration, Error> {
        let fetched: DateTime<Utc> = self
            .fetched_at
            .parse()
            .map_err(|_| Error::InvalidTimestamp(self.fetched_at.clone()))?;
        let elapsed = Utc::now().signed_duration_since(fetched);
        // A clock that moved backwards reads as age zero.
        Ok(elapsed.to_std().unwrap_or(Duration::ZERO))
    }

    /// Whether this entry is within the given freshness window.
    pub fn is_fresh(&self, max_age: Duration) -> Result<bool, Error> {
        Ok(self.age()? <= max_age)
    }
}

/// Aggregate cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: u64,
    pub oldest_fetched_at: Option<String>,
    pub newest_fetched_at: Option<String>,
}

impl CacheDb {
    /// Insert or update a cached entry.
    ///
    /// Uses UPSERT semantics: inserts if the key doesn't exist, replaces
    /// the payload and timestamp if it does (last writer wins).
    pub async fn upsert_entry(&self, entry: &Entry) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (key, resource, params_json, payload, fetched_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(key) DO UPDATE SET
                        resource = excluded.resource,
                        params_json = excluded.params_json,
                        payload = excluded.payload,
                        fetched_at = excluded.fetched_at",
                    params![
                        &entry.key,
                        &entry.resource,
                        &entry.params_json,
                        &entry.payload,
                        &entry.fetched_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an entry by key.
    ///
    /// Returns None if the key doesn't exist in the cache.
    pub async fn get_entry(&self, key: &str) -> Result<Option<Entry>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Entry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key, resource, params_json, payload, fetched_at
                     FROM entries WHERE key = ?1",
                )?;

                let result = stmt.query_row(params![key], |row| {
                    Ok(Entry {
                        key: row.get(0)?,
                        resource: row.get(1)?,
                        params_json: row.get(2)?,
                        payload: row.get(3)?,
                        fetched_at: row.get(4)?,
                    })
                });

                match result {
                    Ok(e) => Ok(Some(e)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete entries fetched longer ago than `age`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_older_than(&self, age: Duration) -> Result<u64, Error> {
        // An age too large for chrono clamps to a cutoff that matches nothing.
        let age = chrono::Duration::from_std(age).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let cutoff = (Utc::now() - age).to_rfc3339();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE fetched_at < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete all entries for one resource.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_resource(&self, resource: &str) -> Result<u64, Error> {
        let resource = resource.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE resource = ?1", params![resource])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry.
    ///
    /// Returns the number of deleted entries.
    pub async fn clear(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Aggregate statistics over the cache.
    pub async fn stats(&self) -> Result<CacheStats, Error> {
        self.conn
            .call(move |conn| -> Result<CacheStats, Error> {
                let entries: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
                let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
                    "SELECT MIN(fetched_at), MAX(fetched_at) FROM entries",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                Ok(CacheStats { entries: entries as u64, oldest_fetched_at: oldest, newest_fetched_at: newest })
            })
            .await
            .map_err(Error::from)
    }
}
