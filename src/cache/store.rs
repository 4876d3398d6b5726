//! Query Cache Module
//!
//! Async front end over the persisted [`CacheDocument`]. Each operation loads
//! the whole document, mutates it and writes it back while holding the lock
//! for its storage key.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cache::{
    CacheDocument, CacheStats, Found, QueryNormalizer, StatusReport, MAX_QUERY_LENGTH,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::storage::{storage_lock, CacheStorage};

// == Lookup Outcome ==
/// Result of [`QueryCache::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// No live entry close enough
    Miss,
    /// The query was stored verbatim
    Exact(V),
    /// A differently phrased stored query matched
    Fuzzy {
        value: V,
        matched_key: String,
        similarity: f64,
    },
}

impl<V> Lookup<V> {
    /// Returns true for exact and fuzzy hits.
    pub fn is_hit(&self) -> bool {
        !matches!(self, Lookup::Miss)
    }

    /// Consumes the outcome, returning the cached value on a hit.
    pub fn into_value(self) -> Option<V> {
        match self {
            Lookup::Miss => None,
            Lookup::Exact(value) | Lookup::Fuzzy { value, .. } => Some(value),
        }
    }
}

impl<V> From<Found<V>> for Lookup<V> {
    fn from(found: Found<V>) -> Self {
        match found {
            Found::Exact(value) => Lookup::Exact(value),
            Found::Fuzzy {
                value,
                matched_key,
                similarity,
            } => Lookup::Fuzzy {
                value,
                matched_key,
                similarity,
            },
        }
    }
}

// == Resolved Value ==
/// Where a value returned by [`QueryCache::lookup_or_fetch`] came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Provenance {
    Exact,
    Fuzzy { matched_key: String, similarity: f64 },
    Fetched,
}

/// A value with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<V> {
    pub value: V,
    pub provenance: Provenance,
}

// == Query Cache ==
/// Fuzzy-matching query result cache over a whole-document storage.
///
/// Persistence faults never reach the caller: an unreadable document reads
/// as an empty cache and failed writes are dropped after logging.
#[derive(Debug)]
pub struct QueryCache<V> {
    storage: Arc<dyn CacheStorage>,
    /// Shared with every cache over the same storage key
    lock: Arc<Mutex<()>>,
    normalizer: QueryNormalizer,
    config: CacheConfig,
    stats: RwLock<CacheStats>,
    _payload: PhantomData<fn() -> V>,
}

impl<V> QueryCache<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    // == Constructor ==
    /// Creates a cache over `storage`.
    ///
    /// Nothing is read until the first operation.
    pub fn new(config: CacheConfig, storage: impl CacheStorage + 'static) -> Result<Self> {
        config.validate()?;
        let storage: Arc<dyn CacheStorage> = Arc::new(storage);

        Ok(Self {
            lock: storage_lock(storage.key()),
            storage,
            normalizer: QueryNormalizer::new(&config.stopwords),
            config,
            stats: RwLock::new(CacheStats::new()),
            _payload: PhantomData,
        })
    }

    /// Returns the tuning parameters.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Lookup ==
    /// Looks up `query` exactly, then fuzzily.
    ///
    /// A hit updates the entry's access metadata and persists it. A miss
    /// has no side effects beyond reaping expired entries.
    pub async fn lookup(&self, query: &str) -> Result<Lookup<V>> {
        validate_query(query)?;
        let _guard = self.lock.lock().await;
        let now = Utc::now();

        let Some(mut doc) = self.load_document(now).await else {
            self.stats.write().await.record_miss();
            return Ok(Lookup::Miss);
        };

        // Reap first so expired entries are never candidates
        let expired = doc.purge_expired(now);
        let found = doc.find(query, &self.normalizer, self.config.fuzzy_threshold, now);
        // Hits carry new access metadata; plain misses leave the document alone
        if found.is_some() || expired > 0 {
            self.persist(&mut doc, now).await;
        }

        let mut stats = self.stats.write().await;
        stats.record_expirations(expired);
        let outcome = found.map(Lookup::from).unwrap_or(Lookup::Miss);
        match &outcome {
            Lookup::Exact(_) => {
                debug!(query, "Cache hit (exact)");
                stats.record_exact_hit();
            }
            Lookup::Fuzzy {
                matched_key,
                similarity,
                ..
            } => {
                debug!(query, matched_key = %matched_key, similarity, "Cache hit (fuzzy)");
                stats.record_fuzzy_hit();
            }
            Lookup::Miss => {
                debug!(query, "Cache miss");
                stats.record_miss();
            }
        }

        Ok(outcome)
    }

    // == Store ==
    /// Caches `value` under the literal `query`.
    ///
    /// Overwrites an existing key. Evicts least recently used entries to
    /// stay within `max_entries`.
    pub async fn store(&self, query: &str, value: V) -> Result<()> {
        validate_query(query)?;
        let _guard = self.lock.lock().await;
        let now = Utc::now();

        let Some(mut doc) = self.load_document(now).await else {
            warn!(query, "Cache document unavailable, dropping write");
            return Ok(());
        };

        let expired = doc.purge_expired(now);
        // Insert, evicting LRU entries down to capacity
        let evicted = doc.insert(query, value, self.config.ttl, self.config.max_entries, now);
        for key in &evicted {
            debug!(key = %key, "Evicted least recently used entry");
        }
        self.persist(&mut doc, now).await;

        let mut stats = self.stats.write().await;
        stats.record_expirations(expired);
        stats.record_evictions(evicted.len());
        debug!(query, entries = doc.len(), "Cached query result");
        Ok(())
    }

    // == Invalidate ==
    /// Removes one exact key, or everything when `query` is `None`.
    ///
    /// Clearing everything always rewrites the document, which also recovers
    /// a corrupt one. Returns the number of entries removed.
    pub async fn invalidate(&self, query: Option<&str>) -> Result<usize> {
        if let Some(q) = query {
            validate_query(q)?;
        }
        let _guard = self.lock.lock().await;
        let now = Utc::now();
        let loaded = self.load_document(now).await;

        match query {
            None => {
                let mut doc = loaded.unwrap_or_else(|| CacheDocument::new(self.config.max_entries, now));
                let removed = doc.clear();
                self.persist(&mut doc, now).await;
                info!(removed, "Cache cleared");
                Ok(removed)
            }
            Some(q) => {
                let Some(mut doc) = loaded else {
                    return Ok(0);
                };
                if !doc.remove(q) {
                    return Ok(0);
                }
                self.persist(&mut doc, now).await;
                info!(query = q, "Cache entry invalidated");
                Ok(1)
            }
        }
    }

    // == Status ==
    /// Reports live entries sorted by descending hit count. Read-only.
    pub async fn status(&self) -> StatusReport {
        let _guard = self.lock.lock().await;
        let now = Utc::now();

        match self.load_document(now).await {
            Some(doc) => StatusReport::from_entries(self.config.max_entries, doc.live_entries(now)),
            None => StatusReport::empty(self.config.max_entries),
        }
    }

    // == Purge Expired ==
    /// Removes all expired entries from the persisted document.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let _guard = self.lock.lock().await;
        let now = Utc::now();

        let Some(mut doc) = self.load_document(now).await else {
            return 0;
        };
        let removed = doc.purge_expired(now);
        if removed > 0 {
            self.persist(&mut doc, now).await;
            self.stats.write().await.record_expirations(removed);
        }
        removed
    }

    // == Lookup Or Fetch ==
    /// Returns the cached value for `query`, or computes, caches and returns it.
    ///
    /// `fetch` runs outside the storage lock and only on a miss. A failed
    /// fetch is reported as [`CacheError::Fetch`] and nothing is cached.
    pub async fn lookup_or_fetch<F, Fut>(&self, query: &str, fetch: F) -> Result<Resolved<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        let resolved = match self.lookup(query).await? {
            Lookup::Exact(value) => Resolved {
                value,
                provenance: Provenance::Exact,
            },
            Lookup::Fuzzy {
                value,
                matched_key,
                similarity,
            } => Resolved {
                value,
                provenance: Provenance::Fuzzy {
                    matched_key,
                    similarity,
                },
            },
            Lookup::Miss => {
                // Fetch runs without the storage lock held
                let value = fetch()
                    .await
                    .map_err(|e| CacheError::Fetch(format!("{:#}", e)))?;
                self.store(query, value.clone()).await?;
                Resolved {
                    value,
                    provenance: Provenance::Fetched,
                }
            }
        };
        Ok(resolved)
    }

    // == Stats ==
    /// Returns the runtime counters for this instance.
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    // == Persistence ==
    /// Loads the document; `None` means it is unreadable and the caller
    /// should behave as if the cache were empty without writing.
    async fn load_document(&self, now: DateTime<Utc>) -> Option<CacheDocument<V>> {
        let raw = match self.storage.load().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Some(CacheDocument::new(self.config.max_entries, now)),
            Err(e) => {
                warn!(storage = self.storage.key(), error = %e, "Failed to read cache document");
                self.stats.write().await.record_storage_error();
                return None;
            }
        };

        match CacheDocument::from_json(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(storage = self.storage.key(), error = %e, "Cache document is corrupt");
                self.stats.write().await.record_storage_error();
                None
            }
        }
    }

    /// Writes the document back. Failures are logged and swallowed.
    async fn persist(&self, doc: &mut CacheDocument<V>, now: DateTime<Utc>) {
        doc.metadata.max_size = self.config.max_entries;
        doc.stamp(now);
        let result = match doc.to_json() {
            Ok(raw) => self.storage.save(&raw).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            error!(storage = self.storage.key(), error = %e, "Failed to persist cache document");
            self.stats.write().await.record_storage_error();
        }
    }
}

// == Validation ==
fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(CacheError::InvalidQuery("Query cannot be empty".to_string()));
    }
    if query.len() > MAX_QUERY_LENGTH {
        return Err(CacheError::InvalidQuery(format!(
            "Query exceeds maximum length of {} bytes",
            MAX_QUERY_LENGTH
        )));
    }
    Ok(())
}
