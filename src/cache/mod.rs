//! Cache Module
//!
//! Persistent query result cache with fuzzy lookup, TTL expiration and LRU eviction.

mod document;
mod entry;
mod lru;
mod matcher;
mod stats;
mod store;


// Re-export public types
pub use document::{CacheDocument, DocumentMetadata, Found};
pub use entry::CacheEntry;
pub use matcher::{best_match, levenshtein, similarity, FuzzyMatch, QueryNormalizer};
pub use stats::{CacheStats, EntryStatus, StatusReport};
pub use store::{Lookup, Provenance, QueryCache, Resolved};

// == Public Constants ==
/// Maximum allowed query length in bytes
pub const MAX_QUERY_LENGTH: usize = 1024;

/// Default entry time to live: 7 days
pub const DEFAULT_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Upper bound on a configured TTL: 10 years
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Default cap on live entries
pub const DEFAULT_MAX_ENTRIES: usize = 10;

/// Default minimum similarity for a fuzzy hit
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Default match-normalization denylist: question words, fillers and
/// generic availability/option words common in spoken FAQ phrasing.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    // question words and auxiliaries
    "what", "when", "where", "which", "who", "how", "why", "is", "are", "was", "do", "does",
    "did", "can", "could", "would", "will", "should", "there", "any",
    // pronouns, articles, prepositions
    "i", "me", "my", "we", "our", "you", "your", "a", "an", "the", "of", "for", "to", "in",
    "on", "at", "about", "with", "have", "has", "get", "tell", "please",
    // availability and option words
    "available", "availability", "option", "options", "offer", "offers", "provide",
    "provides",
];
