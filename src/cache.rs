//! Time-bounded memoization shared by the scrape and scoring stages.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

/// Default lifetime of a cached scrape or scoring result (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Explicit cache key derived from a call's inputs.
pub type Fingerprint = [u8; 32];

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_stale(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// A mutex-guarded map of values that expire `ttl` after insertion.
///
/// The lock is released while a missing value is computed, so two callers
/// racing on the same key may both compute it. Whichever finishes last wins;
/// only completed values are ever shared.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| !entry.is_stale(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key` with a fresh timestamp.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Return the fresh value for `key`, or compute, store and return it.
    ///
    /// Errors from `compute` are returned as-is and nothing is stored.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop every stale entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_stale(self.ttl));
        before - entries.len()
    }

    /// Number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// SHA-256 over a keyword and an ordered list of texts.
///
/// Every part is length-prefixed so `("ab", ["c"])` and `("a", ["bc"])` hash
/// differently.
pub fn fingerprint<S: AsRef<str>>(keyword: &str, texts: &[S]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update((keyword.len() as u64).to_le_bytes());
    hasher.update(keyword.as_bytes());
    hasher.update((texts.len() as u64).to_le_bytes());
    for text in texts {
        let text = text.as_ref();
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hasher.finalize().into()
}
