//! In-process cache with `Instant`-based expiry.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::Cache;

/// A stored value and the moment it stops being served.
#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Thread-safe in-memory [`Cache`].
///
/// Expired entries are dropped lazily: a read that finds an expired entry
/// removes it.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }

    /// Whether no live entry exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write()
            && entries
                .get(key)
                .is_some_and(|e| e.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let expired = {
            let entries = self.entries.read().ok()?;
            let entry = entries.get(key)?;
            if entry.expires_at > Instant::now() {
                return Some(entry.value.clone());
            }
            true
        };
        if expired {
            tracing::debug!(key, "cache entry expired");
            self.evict(key);
        }
        None
    }

    fn put(&self, key: &str, value: &[u8], ttl: Duration) {
        let Some(expires_at) = Instant::now().checked_add(ttl) else {
            return;
        };
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key.to_owned(),
                Entry {
                    value: value.to_vec(),
                    expires_at,
                },
            );
        }
    }
}
