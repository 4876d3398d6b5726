//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, Lookup};

/// Response body for the LOOKUP operation (POST /lookup)
///
/// `kind`, `value`, `matched_key` and `similarity` are omitted on a miss;
/// `matched_key` and `similarity` only appear on fuzzy hits.
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    /// Whether a cached result was found
    pub hit: bool,
    /// "exact" or "fuzzy"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    /// The cached payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// The stored query that matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_key: Option<String>,
    /// Similarity score of the fuzzy match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl From<Lookup<Value>> for LookupResponse {
    fn from(lookup: Lookup<Value>) -> Self {
        match lookup {
            Lookup::Miss => Self {
                hit: false,
                kind: None,
                value: None,
                matched_key: None,
                similarity: None,
            },
            Lookup::Exact(value) => Self {
                hit: true,
                kind: Some("exact"),
                value: Some(value),
                matched_key: None,
                similarity: None,
            },
            Lookup::Fuzzy {
                value,
                matched_key,
                similarity,
            } => Self {
                hit: true,
                kind: Some("fuzzy"),
                value: Some(value),
                matched_key: Some(matched_key),
                similarity: Some(similarity),
            },
        }
    }
}

/// Response body for the STORE operation (PUT /store)
#[derive(Debug, Clone, Serialize)]
pub struct StoreResponse {
    /// Success message
    pub message: String,
    /// The query that was cached
    pub query: String,
}

impl StoreResponse {
    /// Creates a new StoreResponse
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            message: format!("Result for '{}' cached", query),
            query,
        }
    }
}

/// Response body for the invalidation endpoints (DELETE /cache, DELETE /cache/:query)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("{} entries invalidated", removed),
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Exact hits served
    pub exact_hits: u64,
    /// Fuzzy hits served
    pub fuzzy_hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Expired entries reaped
    pub expirations: u64,
    /// Persistence faults absorbed
    pub storage_errors: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            exact_hits: stats.exact_hits,
            fuzzy_hits: stats.fuzzy_hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            storage_errors: stats.storage_errors,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
