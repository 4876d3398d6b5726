//! Cache Statistics Module
//!
//! Runtime counters for one cache instance, plus the status report built
//! from the persisted document.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheEntry;

// == Cache Stats ==
/// Tracks cache performance metrics for this process.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered by a verbatim key
    pub exact_hits: u64,
    /// Lookups answered by a fuzzy match
    pub fuzzy_hits: u64,
    /// Lookups with no qualifying entry
    pub misses: u64,
    /// Entries evicted due to LRU policy
    pub evictions: u64,
    /// Expired entries reaped
    pub expirations: u64,
    /// Persistence faults absorbed
    pub storage_errors: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total hits, exact and fuzzy.
    pub fn hits(&self) -> u64 {
        self.exact_hits + self.fuzzy_hits
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    pub fn record_exact_hit(&mut self) {
        self.exact_hits += 1;
    }

    pub fn record_fuzzy_hit(&mut self) {
        self.fuzzy_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_storage_error(&mut self) {
        self.storage_errors += 1;
    }
}

// == Status Report ==
/// Diagnostic view of one live entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryStatus {
    pub key: String,
    pub hit_count: u64,
    pub cached_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<V> From<&CacheEntry<V>> for EntryStatus {
    fn from(entry: &CacheEntry<V>) -> Self {
        Self {
            key: entry.key.clone(),
            hit_count: entry.hit_count,
            cached_at: entry.cached_at,
            last_accessed: entry.last_accessed,
            expires_at: entry.expires_at,
        }
    }
}

/// Snapshot of the persisted cache for observability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Number of live entries
    pub entry_count: usize,
    /// Configured capacity
    pub max_size: usize,
    /// Live entries, most hit first
    pub entries: Vec<EntryStatus>,
}

impl StatusReport {
    /// Builds a report from live entries, sorted by descending hit count.
    ///
    /// Equal hit counts are ordered by key.
    pub fn from_entries<'a, V: 'a, I>(max_size: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = &'a CacheEntry<V>>,
    {
        let mut entries: Vec<EntryStatus> = entries.into_iter().map(EntryStatus::from).collect();
        entries.sort_by(|a, b| b.hit_count.cmp(&a.hit_count).then_with(|| a.key.cmp(&b.key)));

        Self {
            entry_count: entries.len(),
            max_size,
            entries,
        }
    }

    /// An empty report, used when the document cannot be read.
    pub fn empty(max_size: usize) -> Self {
        Self {
            entry_count: 0,
            max_size,
            entries: Vec::new(),
        }
    }
}
