//! Extension trait for [`Cache`] with string convenience methods.

use std::time::Duration;

use crate::Cache;

/// Typed convenience methods for [`Cache`].
///
/// Implemented as default methods on an extension trait so that [`Cache`]
/// stays object-safe and implementors only handle raw bytes.
pub trait CacheExt: Cache {
    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on miss, expiry, or invalid UTF-8.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value that expires after `ttl`.
    fn put_string(&self, key: &str, value: &str, ttl: Duration) {
        self.put(key, value.as_bytes(), ttl);
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}
