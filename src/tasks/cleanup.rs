//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from the
//! persisted cache document.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::QueryCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// Lookups already ignore and reap expired entries; this keeps the persisted
/// document small between lookups.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(QueryCache::new(CacheConfig::default(), storage)?);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(cache: Arc<QueryCache<V>>, cleanup_interval_secs: u64) -> JoinHandle<()>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            // Reap expired entries under the document lock

            let removed = cache.purge_expired().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
