//! File-based cache implementation.
//!
//! [`FileCache`] stores each entry as a single file named after the
//! percent-encoded key. The file starts with a fixed header followed by the
//! data:
//!
//! ```text
//! [expires_at_ms: u64 LE][data bytes]
//! ```
//!
//! `expires_at_ms` is milliseconds since the Unix epoch. On read, only the
//! header is read first; the data is read only when the entry is still live.
//!
//! On construction, [`FileCache`] validates a `VERSION` file in the cache root.
//! If the version mismatches or is missing, the entire cache directory is wiped
//! and recreated, so entries written by an incompatible build are never served.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tempfile::NamedTempFile;

use crate::Cache;

/// Characters kept verbatim in entry file names.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION                         # contains the cache version string
/// +-- dw.docs.guide.v1.0.index        # cache entry
/// +-- dw.docs.guide.v1.0.setup%2Fnet  # key containing a slash
/// ```
#[derive(Debug)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// If the `VERSION` file inside `root` does not match `version`, the entire
    /// cache directory is removed and recreated with the new version. Errors
    /// during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(entry_name(key))
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        let mut file = File::open(&path).ok()?;

        let mut header = [0u8; 8];
        file.read_exact(&mut header).ok()?;
        let expires_at = u64::from_le_bytes(header);

        if expires_at <= now_millis() {
            tracing::debug!(key, "cache entry expired");
            let _ = fs::remove_file(&path);
            return None;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data).ok()?;
        Some(data)
    }

    fn put(&self, key: &str, value: &[u8], ttl: Duration) {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let expires_at = now_millis().saturating_add(ttl_ms);

        if let Err(e) = fs::create_dir_all(&self.root) {
            tracing::warn!("failed to create cache directory: {e}");
            return;
        }

        let mut buf = Vec::with_capacity(8 + value.len());
        buf.extend_from_slice(&expires_at.to_le_bytes());
        buf.extend_from_slice(value);

        // Each writer gets its own uniquely named sibling; the rename is atomic.
        let path = self.entry_path(key);
        let written = NamedTempFile::new_in(&self.root).and_then(|mut tmp| {
            tmp.write_all(&buf)?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        });
        if let Err(e) = written {
            tracing::warn!(key, "failed to write cache entry: {e}");
        }
    }
}

fn entry_name(key: &str) -> String {
    utf8_percent_encode(key, KEY_ENCODE_SET).to_string()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_put_and_get() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");

        cache.put("dw.docs.guide.v1.index", b"<h1>Guide</h1>", TTL);
        assert_eq!(
            cache.get("dw.docs.guide.v1.index"),
            Some(b"<h1>Guide</h1>".to_vec())
        );
        assert!(cache.has("dw.docs.guide.v1.index"));
    }

    #[test]
    fn test_get_nonexistent_key() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        assert_eq!(cache.get("nonexistent"), None);
        assert!(!cache.has("nonexistent"));
    }

    #[test]
    fn test_expired_entry_is_removed() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");

        cache.put("short", b"data", Duration::from_millis(20));
        thread::sleep(Duration::from_millis(40));

        assert_eq!(cache.get("short"), None);
        assert!(!cache.entry_path("short").exists());
    }

    #[test]
    fn test_keys_with_slashes_stay_flat() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");
        let cache = FileCache::new(root.clone(), "v1");

        cache.put("ns.guide.v1.setup/network", b"nested", TTL);
        cache.put("ns.guide.v1.setup_network", b"flat", TTL);

        assert_eq!(
            cache.get("ns.guide.v1.setup/network"),
            Some(b"nested".to_vec())
        );
        assert_eq!(cache.get("ns.guide.v1.setup_network"), Some(b"flat".to_vec()));
        assert!(!root.join("ns.guide.v1.setup").exists());
    }

    #[test]
    fn test_overwrite() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");

        cache.put("key", b"first", TTL);
        cache.put("key", b"second", TTL);
        assert_eq!(cache.get("key"), Some(b"second".to_vec()));
    }

    #[test]
    fn test_concurrent_writers_of_same_key() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");
        let cache = FileCache::new(root.clone(), "v1");
        let values: Vec<Vec<u8>> = (0..8)
            .map(|i| format!("value-{i}").repeat(512).into_bytes())
            .collect();

        thread::scope(|s| {
            for value in &values {
                let (cache, values) = (&cache, &values);
                s.spawn(move || {
                    for _ in 0..20 {
                        cache.put("shared", value, TTL);
                        let read = cache.get("shared").unwrap();
                        assert!(values.contains(&read));
                    }
                });
            }
        });

        assert!(values.contains(&cache.get("shared").unwrap()));
        let mut names: Vec<String> = fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["VERSION".to_owned(), "shared".to_owned()]);
    }

    #[test]
    fn test_version_match_keeps_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileCache::new(root.clone(), "v1").put("key", b"preserved", TTL);

        let reopened = FileCache::new(root, "v1");
        assert_eq!(reopened.get("key"), Some(b"preserved".to_vec()));
    }

    #[test]
    fn test_version_mismatch_wipes_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileCache::new(root.clone(), "v1").put("key", b"stale", TTL);

        let reopened = FileCache::new(root.clone(), "v2");
        assert_eq!(reopened.get("key"), None);
        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "v2");
    }

    #[test]
    fn test_nonexistent_root_creates_version() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("deeply/nested/cache");

        let _cache = FileCache::new(root.clone(), "v1");

        assert!(root.exists());
        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "v1");
    }
}
