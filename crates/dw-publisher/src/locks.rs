//! Per-product mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of one lock per product slug.
///
/// Entries live as long as the registry; there is one per product ever
/// touched, which is bounded by the documentation root's contents.
#[derive(Debug, Default)]
pub(crate) struct SlugLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SlugLocks {
    /// Lock for `slug`, created on first use.
    pub(crate) fn get(&self, slug: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(slug.to_owned()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_slug_shares_lock() {
        let locks = SlugLocks::default();
        assert!(Arc::ptr_eq(&locks.get("a"), &locks.get("a")));
        assert!(!Arc::ptr_eq(&locks.get("a"), &locks.get("b")));
    }

    #[test]
    fn test_lock_excludes_concurrent_holders() {
        let locks = Arc::new(SlugLocks::default());
        let active = Arc::new(Mutex::new(0_u32));
        let peak = Arc::new(Mutex::new(0_u32));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                std::thread::spawn(move || {
                    let lock = locks.get("shared");
                    let _guard = lock.lock().unwrap();
                    let now = {
                        let mut a = active.lock().unwrap();
                        *a += 1;
                        *a
                    };
                    {
                        let mut p = peak.lock().unwrap();
                        *p = (*p).max(now);
                    }
                    std::thread::sleep(std::time::Duration::from_millis(5));
                    *active.lock().unwrap() -= 1;
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(*peak.lock().unwrap(), 1);
    }
}
