//! Per-document lock registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tokio::sync::Mutex as AsyncMutex;

static LOCKS: OnceLock<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>> = OnceLock::new();

// == Storage Lock ==
/// Returns the process-wide async mutex guarding the document at `key`.
///
/// Every caller asking for the same key gets the same mutex, so independent
/// cache instances over one document never interleave read-modify-write cycles.
/// Mutexes no cache holds any more are dropped from the registry.
pub fn storage_lock(key: &str) -> Arc<AsyncMutex<()>> {
    let mut locks = registry();
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    locks
        .entry(key.to_string())
        .or_insert_with(|| Arc::new(AsyncMutex::new(())))
        .clone()
}

fn registry() -> MutexGuard<'static, HashMap<String, Arc<AsyncMutex<()>>>> {
    LOCKS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_shares_lock() {
        let a = storage_lock("lock-test-shared");
        let b = storage_lock("lock-test-shared");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_keys_get_different_locks() {
        let a = storage_lock("lock-test-one");
        let b = storage_lock("lock-test-two");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_unused_locks_are_pruned() {
        let held = storage_lock("lock-test-held");
        drop(storage_lock("lock-test-dropped"));

        // any later call sweeps the registry
        let _other = storage_lock("lock-test-sweep");

        let locks = registry();
        assert!(!locks.contains_key("lock-test-dropped"));
        assert!(locks.contains_key("lock-test-held"));
        drop(locks);
        assert!(Arc::ptr_eq(&held, &storage_lock("lock-test-held")));
    }

    #[tokio::test]
    async fn test_lock_excludes_second_holder() {
        let lock = storage_lock("lock-test-exclusive");
        let _guard = lock.lock().await;

        assert!(storage_lock("lock-test-exclusive").try_lock().is_err());
    }
}
