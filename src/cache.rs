//! In-memory result cache with a fixed time-to-live.
//!
//! Backed by [`moka`], which expires entries on read and evicts them in the
//! background, so no sweeper task is needed.

use std::time::Duration;

use moka::future::Cache;

/// Default lifetime of a cached entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Upper bound on stored queries; the least recently used are evicted first.
const MAX_ENTRIES: u64 = 10_000;

/// A process-local key/value store whose entries expire after a fixed TTL.
///
/// Reads past an entry's deadline behave exactly like a miss. Concurrent
/// writers to the same key are last-writer-wins.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Cache<String, V>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Returns the configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a clone of the live value for `key`.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).await
    }

    /// Stores `value` under `key`, expiring one TTL from now.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), value).await;
    }

    /// Returns whether a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
