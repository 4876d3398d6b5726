//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Request body for the LOOKUP operation (POST /lookup)
#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    /// The caller's query text
    pub query: String,
}

/// Request body for the STORE operation (PUT /store)
///
/// # Fields
/// - `query`: The query text the result was computed for
/// - `value`: The retrieval result, cached verbatim
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    /// The query text
    pub query: String,
    /// The result payload
    pub value: Value,
}
