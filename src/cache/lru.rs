//! LRU Eviction Module
//!
//! Picks least recently used entries for eviction.

use std::collections::BTreeMap;

use crate::cache::CacheEntry;

// == LRU Order ==
/// Sort key for recency: oldest `last_accessed` first, then oldest access sequence.
///
/// Hit count and creation time play no part.
fn recency<V>(entry: &CacheEntry<V>) -> (chrono::DateTime<chrono::Utc>, u64) {
    (entry.last_accessed, entry.access_seq)
}

// == Peek Oldest ==
/// Returns the key of the least recently used entry, if any.
pub fn oldest<V>(entries: &BTreeMap<String, CacheEntry<V>>) -> Option<&str> {
    entries
        .iter()
        .min_by_key(|(_, entry)| recency(entry))
        .map(|(key, _)| key.as_str())
}

// == Evict ==
/// Removes least recently used entries until at most `target` remain.
///
/// Returns the evicted keys, oldest first.
pub fn evict_down_to<V>(entries: &mut BTreeMap<String, CacheEntry<V>>, target: usize) -> Vec<String> {
    let mut evicted = Vec::new();

    while entries.len() > target {
        let Some(key) = oldest(entries).map(str::to_owned) else {
            break;
        };
        entries.remove(&key);
        evicted.push(key);
    }

    evicted
}
