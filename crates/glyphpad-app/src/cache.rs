//! Keyed query cache with a stale time.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Default time a cached query stays fresh.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60);

/// Cache key for the "current progress" query.
pub const PROGRESS_CURRENT_KEY: &str = "progress/current";

/// The part of a query cache the submission pipeline needs.
pub trait ProgressCache: Send + Sync {
    /// Mark `key` as stale so the next read refetches.
    fn invalidate(&self, key: &str);
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
}

/// In-memory query cache.
#[derive(Debug)]
pub struct QueryCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    stale_time: Duration,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}

impl<T> QueryCache<T> {
    /// Create a cache whose entries go stale after `stale_time`.
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stale_time,
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Store a freshly fetched value.
    pub fn insert(&self, key: &str, value: T) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(
                    key.to_string(),
                    CacheEntry {
                        value,
                        fetched_at: Instant::now(),
                    },
                );
            }
            Err(e) => log::warn!("Query cache lock poisoned: {}", e),
        }
    }

    /// Check if `key` holds a value that is still fresh.
    pub fn is_fresh(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|entries| {
                entries
                    .get(key)
                    .is_some_and(|entry| entry.fetched_at.elapsed() < self.stale_time)
            })
            .unwrap_or(false)
    }
}

impl<T: Clone> QueryCache<T> {
    /// The cached value for `key` if it is still fresh.
    pub fn get_fresh(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().ok()?;
        entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| entry.value.clone())
    }
}

impl<T: Send + Sync> ProgressCache for QueryCache<T> {
    fn invalidate(&self, key: &str) {
        match self.entries.write() {
            Ok(mut entries) => {
                if entries.remove(key).is_some() {
                    log::debug!("Invalidated query {key}");
                }
            }
            Err(e) => log::warn!("Query cache lock poisoned: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get_fresh() {
        let cache = QueryCache::new(Duration::from_secs(60));
        assert!(cache.get_fresh(PROGRESS_CURRENT_KEY).is_none());

        cache.insert(PROGRESS_CURRENT_KEY, 42);
        assert_eq!(cache.get_fresh(PROGRESS_CURRENT_KEY), Some(42));
        assert!(cache.is_fresh(PROGRESS_CURRENT_KEY));
    }

    #[test]
    fn test_invalidate() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(PROGRESS_CURRENT_KEY, "a".to_string());
        cache.insert("profile", "b".to_string());

        cache.invalidate(PROGRESS_CURRENT_KEY);
        assert!(cache.get_fresh(PROGRESS_CURRENT_KEY).is_none());
        assert_eq!(cache.get_fresh("profile").as_deref(), Some("b"));

        // Unknown keys are fine.
        cache.invalidate("missing");
    }

    #[test]
    fn test_zero_stale_time_is_never_fresh() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.insert("k", 1);
        assert!(cache.get_fresh("k").is_none());
        assert!(!cache.is_fresh("k"));
    }
}
