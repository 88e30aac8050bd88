//! Cache abstraction layer for DW.
//!
//! The [`Cache`] trait is the whole contract consumers depend on: atomic
//! `get`/`put`/`has` over string keys with a per-entry time-to-live. Expiry is
//! the only invalidation mechanism; nothing removes entries early.
//!
//! # Implementations
//!
//! - [`MemoryCache`]: In-process map with `Instant`-based expiry
//! - [`FileCache`]: One file per key with an expiry header and version validation
//! - [`NullCache`]: No-op implementation (always misses)
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use dw_cache::{Cache, CacheExt, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! cache.put_string("dw.docs.guide.v1.index", "<h1>Guide</h1>", Duration::from_secs(300));
//! assert!(cache.has("dw.docs.guide.v1.index"));
//! assert_eq!(
//!     cache.get_string("dw.docs.guide.v1.index").as_deref(),
//!     Some("<h1>Guide</h1>")
//! );
//! ```

mod ext;
mod file;
mod memory;

use std::time::Duration;

pub use ext::CacheExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// Key-value store with TTL-based expiry.
///
/// Implementations must be safe to share between threads. An expired entry is
/// indistinguishable from a missing one.
pub trait Cache: Send + Sync {
    /// Retrieve a live value.
    ///
    /// Returns `None` on a miss or when the entry has expired.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value that expires after `ttl`.
    ///
    /// Overwrites any existing entry for the same key.
    fn put(&self, key: &str, value: &[u8], ttl: Duration);

    /// Whether a live value exists for `key`.
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// No-op [`Cache`] that never stores or retrieves data.
///
/// Use when caching is disabled. Every `get` returns `None`; every `put` is
/// silently discarded.
#[derive(Debug, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn put(&self, _key: &str, _value: &[u8], _ttl: Duration) {}

    fn has(&self, _key: &str) -> bool {
        false
    }
}
