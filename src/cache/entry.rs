//! Cache Entry Module
//!
//! Defines a single cached query result with TTL and access metadata.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached result set together with its expiry and access metadata.
///
/// `key` is the literal query text the caller stored; it is never
/// match-normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// The query text this entry was stored under
    pub key: String,
    /// The opaque result payload
    pub value: V,
    /// Creation time
    pub cached_at: DateTime<Utc>,
    /// `cached_at + ttl`
    pub expires_at: DateTime<Utc>,
    /// Time of the most recent hit (or creation)
    pub last_accessed: DateTime<Utc>,
    /// Number of exact or fuzzy hits served
    pub hit_count: u64,
    /// Document-wide access sequence, breaks `last_accessed` ties
    #[serde(default)]
    pub access_seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry created and last accessed at `now`.
    ///
    /// # Arguments
    /// * `key` - The query text
    /// * `value` - The result payload
    /// * `ttl` - Time to live applied from `now`
    /// * `now` - Creation instant
    pub fn new(key: String, value: V, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            key,
            value,
            cached_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            last_accessed: now,
            hit_count: 0,
            access_seq: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so
    /// a fully elapsed TTL is never served.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    // == Touch ==
    /// Records a hit at `now`.
    ///
    /// `last_accessed` never moves backwards even if the clock does.
    pub fn touch(&mut self, now: DateTime<Utc>, seq: u64) {
        if now > self.last_accessed {
            self.last_accessed = now;
        }
        self.hit_count += 1;
        self.access_seq = seq;
    }

    // == Time To Live ==
    /// Returns the remaining TTL at `now`, zero once expired.
    pub fn ttl_remaining_at(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}
