//! Cache-or-fetch wrapper with stale fallback.
//!
//! [`fetch_cached`] is the single path every collection fetch goes through:
//! serve the cached value while it is fresh, refresh it from the remote
//! source once it is not, and fall back to the stale copy when the remote
//! source fails. The remote error is logged and swallowed so a build can
//! finish on last-known content.

use super::connection::CacheDb;
use super::entries::Entry;
use super::keys::cache_key;
use crate::Error;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// Outcome of a cached fetch, preserving freshness for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// Within the freshness window, or just refreshed from the remote source.
    Fresh(T),
    /// The remote source failed; this is the last value persisted on disk.
    Stale(T),
    /// No remote value and nothing usable on disk.
    Empty,
}

impl<T> Fetched<T> {
    /// Consume, discarding freshness.
    pub fn into_value(self) -> Option<T> {
        match self {
            Fetched::Fresh(v) | Fetched::Stale(v) => Some(v),
            Fetched::Empty => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Fetched::Fresh(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Fetched::Stale(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Fetched::Empty)
    }

    /// Map the carried value, keeping the freshness state.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetched<U> {
        match self {
            Fetched::Fresh(v) => Fetched::Fresh(f(v)),
            Fetched::Stale(v) => Fetched::Stale(f(v)),
            Fetched::Empty => Fetched::Empty,
        }
    }
}

/// Fetch a collection through the cache.
///
/// - A stored entry younger than `max_age` is returned as-is without
///   invoking `fetch` (cache hit).
/// - Otherwise `fetch` runs exactly once; on success the result is
///   persisted under the (resource, params) key and returned.
/// - On remote failure the previous on-disk value is returned unchanged,
///   or [`Fetched::Empty`] if none exists. The remote error never
///   propagates.
///
/// A stored payload that no longer deserializes is treated as absent.
///
/// # Errors
///
/// Only cache I/O failures surface as errors.
pub async fn fetch_cached<T, E, F, Fut>(
    db: &CacheDb,
    resource: &str,
    params_json: &str,
    max_age: Duration,
    fetch: F,
) -> Result<Fetched<T>, Error>
where
    T: Serialize + DeserializeOwned,
    E: std::fmt::Display,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let key = cache_key(resource, params_json);
    let cached = db.get_entry(&key).await?;

    if let Some(entry) = &cached
        && entry.is_fresh(max_age).unwrap_or(false)
    {
        match serde_json::from_str(&entry.payload) {
            Ok(value) => {
                tracing::debug!("cache hit for {} ({})", resource, &key[..8]);
                return Ok(Fetched::Fresh(value));
            }
            Err(e) => {
                tracing::warn!("discarding undecodable cache entry for {}: {}", resource, e);
            }
        }
    }

    match fetch().await {
        Ok(value) => {
            let payload = serde_json::to_string(&value).map_err(|e| Error::Serialize(e.to_string()))?;
            db.upsert_entry(&Entry {
                key,
                resource: resource.to_string(),
                params_json: params_json.to_string(),
                payload,
                fetched_at: Utc::now().to_rfc3339(),
            })
            .await?;
            tracing::debug!("refreshed {} from remote source", resource);
            Ok(Fetched::Fresh(value))
        }
        Err(err) => {
            tracing::warn!("remote fetch for {} failed, serving stale cache: {}", resource, err);
            match cached {
                Some(entry) => match serde_json::from_str(&entry.payload) {
                    Ok(value) => Ok(Fetched::Stale(value)),
                    Err(e) => {
                        tracing::warn!("stale cache entry for {} undecodable: {}", resource, e);
                        Ok(Fetched::Empty)
                    }
                },
                None => Ok(Fetched::Empty),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Doc {
        id: String,
        title: String,
    }

    fn docs(n: usize) -> Vec<Doc> {
        (0..n)
            .map(|i| Doc { id: format!("{}", i), title: format!("Doc {}", i) })
            .collect()
    }

    const DAY: Duration = Duration::from_secs(24 * 3600);

    #[tokio::test]
    async fn test_miss_fetches_and_persists() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let calls = AtomicUsize::new(0);

        let result = fetch_cached(&db, "posts", "{}", DAY, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(docs(2))
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result, Fetched::Fresh(docs(2)));

        let key = cache_key("posts", "{}");
        let entry = db.get_entry(&key).await.unwrap().unwrap();
        let stored: Vec<Doc> = serde_json::from_str(&entry.payload).unwrap();
        assert_eq!(stored, docs(2));
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_remote() {
        let db = CacheDb::open_in_memory().await.unwrap();
        fetch_cached(&db, "posts", "{}", DAY, || async { Ok::<_, String>(docs(3)) })
            .await
            .unwrap();

        let calls = AtomicUsize::new(0);
        let result = fetch_cached(&db, "posts", "{}", DAY, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(docs(99))
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0, "remote must not run on a fresh hit");
        assert_eq!(result, Fetched::Fresh(docs(3)));
    }

    #[tokio::test]
    async fn test_expired_entry_refetches_once() {
        let db = CacheDb::open_in_memory().await.unwrap();
        fetch_cached(&db, "posts", "{}", DAY, || async { Ok::<_, String>(docs(1)) })
            .await
            .unwrap();

        let calls = AtomicUsize::new(0);
        let result = fetch_cached(&db, "posts", "{}", Duration::ZERO, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(docs(5))
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result, Fetched::Fresh(docs(5)));
    }

    #[tokio::test]
    async fn test_remote_failure_serves_stale() {
        let db = CacheDb::open_in_memory().await.unwrap();
        fetch_cached(&db, "posts", "{}", DAY, || async { Ok::<_, String>(docs(4)) })
            .await
            .unwrap();

        // Expired window plus failing remote: the old value comes back unchanged.
        let result = fetch_cached(&db, "posts", "{}", Duration::ZERO, || async {
            Err::<Vec<Doc>, _>("connection refused".to_string())
        })
        .await
        .unwrap();

        assert_eq!(result, Fetched::Stale(docs(4)));
    }

    #[tokio::test]
    async fn test_remote_failure_without_cache_is_empty() {
        let db = CacheDb::open_in_memory().await.unwrap();

        let result = fetch_cached(&db, "tags", "{}", DAY, || async {
            Err::<Vec<Doc>, _>("dns failure".to_string())
        })
        .await
        .unwrap();

        assert_eq!(result, Fetched::Empty);
    }

    #[tokio::test]
    async fn test_distinct_params_are_distinct_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        fetch_cached(&db, "pages", r#"{"limit":"all"}"#, DAY, || async { Ok::<_, String>(docs(1)) })
            .await
            .unwrap();
        fetch_cached(&db, "pages", r#"{"filter":"tag:hash-footer"}"#, DAY, || async {
            Ok::<_, String>(docs(2))
        })
        .await
        .unwrap();

        assert_eq!(db.stats().await.unwrap().entries, 2);
    }

    #[test]
    fn test_fetched_accessors() {
        let fresh: Fetched<i32> = Fetched::Fresh(1);
        assert!(fresh.is_fresh());
        assert_eq!(fresh.clone().into_value(), Some(1));

        let stale: Fetched<i32> = Fetched::Stale(2);
        assert!(stale.is_stale());
        assert_eq!(stale.map(|v| v * 10).into_value(), Some(20));

        let empty: Fetched<i32> = Fetched::Empty;
        assert!(empty.is_empty());
        assert_eq!(empty.into_value(), None);
    }
}
