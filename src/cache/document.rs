//! Cache Document Module
//!
//! The persisted cache store and its in-memory state machine. Every operation
//! takes an explicit `now`, so expiry and recency are deterministic to test.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::cache::matcher::{best_match, QueryNormalizer};
use crate::cache::{lru, CacheEntry};
use crate::error::{CacheError, Result};

// == Document Metadata ==
/// Bookkeeping stored next to the entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Configured capacity at the last write
    pub max_size: usize,
    /// Entry count at the last write
    pub current_size: usize,
    /// When the document was first created
    pub created_at: DateTime<Utc>,
    /// When the document was last written
    pub last_updated: DateTime<Utc>,
    /// Source of `CacheEntry::access_seq`
    #[serde(default)]
    pub access_counter: u64,
}

// == Found Entry ==
/// Result of an in-memory lookup against the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Found<V> {
    /// Verbatim key match
    Exact(V),
    /// Approximate match above the threshold
    Fuzzy {
        value: V,
        matched_key: String,
        similarity: f64,
    },
}

// == Cache Document ==
/// The whole persisted cache: `{ entries, metadata }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "V: Serialize",
    deserialize = "V: DeserializeOwned"
))]
pub struct CacheDocument<V> {
    /// Entries keyed by their literal query text
    pub entries: BTreeMap<String, CacheEntry<V>>,
    pub metadata: DocumentMetadata,
}

impl<V> CacheDocument<V> {
    // == Constructor ==
    /// Creates an empty document.
    pub fn new(max_size: usize, now: DateTime<Utc>) -> Self {
        Self {
            entries: BTreeMap::new(),
            metadata: DocumentMetadata {
                max_size,
                current_size: 0,
                created_at: now,
                last_updated: now,
                access_counter: 0,
            },
        }
    }

    /// Returns the number of physically present entries (expired included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the document holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_seq(&mut self) -> u64 {
        self.metadata.access_counter += 1;
        self.metadata.access_counter
    }

    // == Purge Expired ==
    /// Removes every entry expired at `now`. Returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Find ==
    /// Looks `query` up exactly, then fuzzily, among entries live at `now`.
    ///
    /// A hit updates the entry's access metadata. Expired entries are never
    /// candidates, even if they have not been purged yet.
    pub fn find(
        &mut self,
        query: &str,
        normalizer: &QueryNormalizer,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> Option<Found<V>>
    where
        V: Clone,
    {
        if self
            .entries
            .get(query)
            .is_some_and(|entry| !entry.is_expired_at(now))
        {
            let seq = self.next_seq();
            let entry = self.entries.get_mut(query)?;
            entry.touch(now, seq);
            return Some(Found::Exact(entry.value.clone()));
        }

        let live_keys = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.as_str());
        let best = best_match(normalizer, query, live_keys, threshold)
            .map(|m| (m.key.to_owned(), m.similarity))?;

        let (matched_key, similarity) = best;
        let seq = self.next_seq();
        let entry = self.entries.get_mut(&matched_key)?;
        entry.touch(now, seq);

        Some(Found::Fuzzy {
            value: entry.value.clone(),
            matched_key,
            similarity,
        })
    }

    // == Insert ==
    /// Stores `value` under the literal `query`, evicting LRU entries if needed.
    ///
    /// Expired entries are purged first so they never occupy a slot. An
    /// existing key is overwritten with fresh timestamps and a zero hit count.
    /// A document loaded with more entries than `max_size` is trimmed here,
    /// overwrite or not. Returns the evicted keys.
    pub fn insert(
        &mut self,
        query: &str,
        value: V,
        ttl: Duration,
        max_size: usize,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        self.purge_expired(now);

        // the overwritten key never counts as an LRU victim
        self.entries.remove(query);
        let evicted = lru::evict_down_to(&mut self.entries, max_size.saturating_sub(1));

        let mut entry = CacheEntry::new(query.to_string(), value, ttl, now);
        entry.access_seq = self.next_seq();
        self.entries.insert(query.to_string(), entry);

        self.metadata.max_size = max_size;
        evicted
    }

    // == Remove ==
    /// Removes the exact key `query`. Returns true if it was present.
    pub fn remove(&mut self, query: &str) -> bool {
        self.entries.remove(query).is_some()
    }

    // == Clear ==
    /// Drops every entry. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Live Entries ==
    /// Iterates entries not expired at `now`.
    pub fn live_entries(&self, now: DateTime<Utc>) -> impl Iterator<Item = &CacheEntry<V>> {
        self.entries
            .values()
            .filter(move |entry| !entry.is_expired_at(now))
    }

    // == Stamp ==
    /// Refreshes metadata right before the document is written.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        self.metadata.current_size = self.entries.len();
        if now > self.metadata.last_updated {
            self.metadata.last_updated = now;
        }
    }
}

impl<V: Serialize + DeserializeOwned> CacheDocument<V> {
    // == Serialization ==
    /// Parses a persisted document.
    ///
    /// Every entry must be filed under its own `key`; a mismatch means the
    /// document was edited by hand or damaged and is reported as corrupt.
    pub fn from_json(raw: &str) -> Result<Self> {
        let document: Self =
            serde_json::from_str(raw).map_err(|e| CacheError::StorageCorrupt(e.to_string()))?;

        let mismatch = document
            .entries
            .iter()
            .find(|(key, entry)| **key != entry.key);
        if let Some((key, entry)) = mismatch {
            return Err(CacheError::StorageCorrupt(format!(
                "entry filed under {:?} has key {:?}",
                key, entry.key
            )));
        }

        Ok(document)
    }

    /// Serializes the document for persistence.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CacheError::Internal(e.to_string()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 0.8;

    fn ttl() -> Duration {
        Duration::days(7)
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn secs(n: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(n)
    }

    #[test]
    fn test_exact_hit_after_insert() {
        let normalizer = QueryNormalizer::default();
        let mut doc = CacheDocument::new(10, t0());

        doc.insert("parking availability", "v1", ttl(), 10, t0());
        let found = doc.find("parking availability", &normalizer, THRESHOLD, secs(1));

        assert_eq!(found, Some(Found::Exact("v1")));
        let entry = &doc.entries["parking availability"];
        assert_eq!(entry.hit_count, 1);
        assert_eq!(entry.last_accessed, secs(1));
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let normalizer = QueryNormalizer::default();
        let mut doc = CacheDocument::new(10, t0());
        doc.insert("Opening Hours", "v", ttl(), 10, t0());

        // falls through to the fuzzy scan, which is case-insensitive
        let found = doc.find("opening hours", &normalizer, THRESHOLD, secs(1));
        assert!(matches!(found, Some(Found::Fuzzy { similarity, .. }) if similarity == 1.0));
    }

    #[test]
    fn test_fuzzy_hit_parking() {
        let normalizer = QueryNormalizer::default();
        let mut doc = CacheDocument::new(10, t0());
        doc.insert("parking availability", "v1", ttl(), 10, t0());

        let found = doc.find("Is parking available?", &normalizer, THRESHOLD, secs(1));

        match found {
            Some(Found::Fuzzy {
                value,
                matched_key,
                similarity,
            }) => {
                assert_eq!(value, "v1");
                assert_eq!(matched_key, "parking availability");
                assert!(similarity >= THRESHOLD);
            }
            other => panic!("expected fuzzy hit, got {:?}", other),
        }
        assert_eq!(doc.entries["parking availability"].hit_count, 1);
    }

    #[test]
    fn test_unrelated_query_misses() {
        let normalizer = QueryNormalizer::default();
        let mut doc = CacheDocument::new(10, t0());
        doc.insert("parking availability", "v1", ttl(), 10, t0());

        let found = doc.find("completely unrelated topic", &normalizer, THRESHOLD, secs(1));

        assert_eq!(found, None);
        assert_eq!(doc.entries["parking availability"].hit_count, 0);
    }

    #[test]
    fn test_ttl_boundary() {
        let normalizer = QueryNormalizer::default();
        let eps = Duration::milliseconds(1);
        let mut doc = CacheDocument::new(10, t0());
        doc.insert("kids menu", 1, ttl(), 10, t0());

        assert_eq!(
            doc.find("kids menu", &normalizer, THRESHOLD, t0() + ttl() - eps),
            Some(Found::Exact(1))
        );
        assert_eq!(doc.find("kids menu", &normalizer, THRESHOLD, t0() + ttl() + eps), None);
        assert_eq!(doc.find("kid menu", &normalizer, THRESHOLD, t0() + ttl() + eps), None);
    }

    #[test]
    fn test_expired_entry_never_fuzzy_matched() {
        let normalizer = QueryNormalizer::default();
        let mut doc = CacheDocument::new(10, t0());
        doc.insert("kids menu", "stale", Duration::seconds(10), 10, t0());
        doc.insert("kids menus today", "fresh", ttl(), 10, t0());

        let found = doc.find("kid menu", &normalizer, 0.4, secs(20));

        assert!(matches!(found, Some(Found::Fuzzy { ref matched_key, .. }) if matched_key == "kids menus today"));
    }

    #[test]
    fn test_insert_evicts_least_recently_used() {
        let normalizer = QueryNormalizer::default();
        let mut doc = CacheDocument::new(3, t0());
        doc.insert("q1", 1, ttl(), 3, secs(0));
        doc.insert("q2", 2, ttl(), 3, secs(1));
        doc.insert("q3", 3, ttl(), 3, secs(2));

        // q1 becomes most recently used
        doc.find("q1", &normalizer, THRESHOLD, secs(3));
        let evicted = doc.insert("q4", 4, ttl(), 3, secs(4));

        assert_eq!(evicted, vec!["q2".to_string()]);
        assert_eq!(doc.len(), 3);
        assert!(doc.entries.contains_key("q1"));
    }

    #[test]
    fn test_insert_same_instant_evicts_in_insertion_order() {
        let mut doc = CacheDocument::new(2, t0());
        doc.insert("zeta", 1, ttl(), 2, t0());
        doc.insert("alpha", 2, ttl(), 2, t0());
        let evicted = doc.insert("mid", 3, ttl(), 2, t0());

        assert_eq!(evicted, vec!["zeta".to_string()]);
    }

    #[test]
    fn test_expired_entries_do_not_count_for_occupancy() {
        let mut doc = CacheDocument::new(2, t0());
        doc.insert("old", 1, Duration::seconds(5), 2, secs(0));
        doc.insert("live", 2, ttl(), 2, secs(1));

        let evicted = doc.insert("new", 3, ttl(), 2, secs(10));

        assert!(evicted.is_empty());
        assert!(doc.entries.contains_key("live"));
        assert!(doc.entries.contains_key("new"));
        assert!(!doc.entries.contains_key("old"));
    }

    #[test]
    fn test_overwrite_resets_entry() {
        let normalizer = QueryNormalizer::default();
        let mut doc = CacheDocument::new(2, t0());
        doc.insert("q", 1, ttl(), 2, secs(0));
        doc.insert("other", 9, ttl(), 2, secs(0));
        doc.find("q", &normalizer, THRESHOLD, secs(1));

        let evicted = doc.insert("q", 2, ttl(), 2, secs(2));

        assert!(evicted.is_empty());
        assert_eq!(doc.len(), 2);
        let entry = &doc.entries["q"];
        assert_eq!(entry.value, 2);
        assert_eq!(entry.hit_count, 0);
        assert_eq!(entry.cached_at, secs(2));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut doc = CacheDocument::new(5, t0());
        doc.insert("a", 1, ttl(), 5, t0());
        doc.insert("b", 2, ttl(), 5, t0());

        assert!(doc.remove("a"));
        assert!(!doc.remove("a"));
        assert_eq!(doc.clear(), 1);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let mut doc = CacheDocument::new(5, t0());
        doc.insert("short", 1, Duration::seconds(5), 5, t0());
        doc.insert("long", 2, ttl(), 5, t0());

        assert_eq!(doc.purge_expired(secs(4)), 0);
        assert_eq!(doc.purge_expired(secs(5)), 1);
        assert_eq!(doc.live_entries(secs(5)).count(), 1);
    }

    #[test]
    fn test_json_round_trip_preserves_lookup() {
        let normalizer = QueryNormalizer::default();
        let mut doc = CacheDocument::new(10, t0());
        doc.insert(
            "parking availability",
            vec!["lot behind".to_string()],
            ttl(),
            10,
            t0(),
        );
        doc.stamp(t0());

        let raw = doc.to_json().unwrap();
        let mut reloaded: CacheDocument<Vec<String>> = CacheDocument::from_json(&raw).unwrap();

        assert_eq!(reloaded.metadata.current_size, 1);
        let found = reloaded.find("Is parking available?", &normalizer, THRESHOLD, secs(1));
        assert!(matches!(found, Some(Found::Fuzzy { ref value, .. }) if value == &vec!["lot behind".to_string()]));
    }

    #[test]
    fn test_persisted_layout() {
        let mut doc = CacheDocument::new(10, t0());
        doc.insert("q", 1, ttl(), 10, t0());
        doc.stamp(t0());

        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(json["metadata"]["maxSize"], 10);
        assert_eq!(json["metadata"]["currentSize"], 1);
        assert_eq!(json["entries"]["q"]["hitCount"], 0);
        assert_eq!(json["entries"]["q"]["value"], 1);
    }

    fn tampered_json() -> String {
        let mut doc = CacheDocument::new(1, t0());
        doc.insert("a", 1, ttl(), 1, t0());
        doc.stamp(t0());
        let mut json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        json["entries"]["a"]["key"] = serde_json::json!("b");
        json.to_string()
    }

    #[test]
    fn test_from_json_rejects_mismatched_entry_key() {
        let result = CacheDocument::<u32>::from_json(&tampered_json());
        assert!(matches!(result, Err(CacheError::StorageCorrupt(ref msg)) if msg.contains("\"b\"")));
    }

    #[test]
    fn test_insert_terminates_on_mismatched_entry_key() {
        let mut doc: CacheDocument<u32> = serde_json::from_str(&tampered_json()).unwrap();

        let evicted = doc.insert("c", 2, ttl(), 1, secs(1));

        assert_eq!(evicted, vec!["a".to_string()]);
        assert_eq!(doc.len(), 1);
        assert!(doc.entries.contains_key("c"));
    }

    #[test]
    fn test_overwrite_trims_oversized_document() {
        let mut doc = CacheDocument::new(10, t0());
        for i in 0..6 {
            doc.insert(&format!("question {}", i), i, ttl(), 10, secs(i as i64));
        }

        // capacity lowered between runs, then an existing key is rewritten
        let evicted = doc.insert("question 5", 99, ttl(), 3, secs(10));

        assert_eq!(doc.len(), 3);
        assert_eq!(
            evicted,
            vec![
                "question 0".to_string(),
                "question 1".to_string(),
                "question 2".to_string()
            ]
        );
        assert_eq!(doc.entries["question 5"].value, 99);
        assert_eq!(doc.metadata.max_size, 3);
    }

    #[test]
    fn test_insert_new_key_trims_oversized_document() {
        let mut doc = CacheDocument::new(10, t0());
        for i in 0..6 {
            doc.insert(&format!("question {}", i), i, ttl(), 10, secs(i as i64));
        }

        doc.insert("question 6", 6, ttl(), 3, secs(10));

        assert_eq!(doc.len(), 3);
        assert!(doc.entries.contains_key("question 4"));
        assert!(doc.entries.contains_key("question 5"));
        assert!(doc.entries.contains_key("question 6"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = CacheDocument::<u32>::from_json("{ not json");
        assert!(matches!(result, Err(CacheError::StorageCorrupt(_))));
    }
}
