//! Error types for the query cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the query cache and its HTTP surface.
///
/// Storage variants are produced by [`crate::storage`] and absorbed by
/// [`crate::cache::QueryCache`]; callers only ever see `InvalidQuery`,
/// `InvalidConfig` and `Fetch`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Query text rejected before matching
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Cache configuration out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Backing document exists but could not be read
    #[error("Storage read failed: {0}")]
    StorageRead(String),

    /// Backing document could not be parsed
    #[error("Storage corrupt: {0}")]
    StorageCorrupt(String),

    /// Backing document could not be written
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// Caller-supplied fetch failed on a cache miss
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidQuery(_) | CacheError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            CacheError::Fetch(_) => StatusCode::BAD_GATEWAY,
            CacheError::StorageRead(_)
            | CacheError::StorageCorrupt(_)
            | CacheError::StorageWrite(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the query cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_query_maps_to_bad_request() {
        let response = CacheError::InvalidQuery("empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_fetch_maps_to_bad_gateway() {
        let response = CacheError::Fetch("upstream down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_storage_errors_map_to_internal() {
        let response = CacheError::StorageWrite("disk full".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_display() {
        let err = CacheError::StorageCorrupt("expected value at line 1".to_string());
        assert_eq!(err.to_string(), "Storage corrupt: expected value at line 1");
    }
}
