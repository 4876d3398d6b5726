//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{QueryCache, StatusReport};
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    HealthResponse, InvalidateResponse, LookupRequest, LookupResponse, StatsResponse,
    StoreRequest, StoreResponse,
};
use crate::storage::FileStorage;

/// Application state shared across all handlers.
///
/// The cache serializes its own read-modify-write cycles, so it is shared
/// behind a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Query result cache over JSON payloads
    pub cache: Arc<QueryCache<Value>>,
}

impl AppState {
    /// Creates a new AppState with the given cache.
    pub fn new(cache: QueryCache<Value>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The cache document lives at `config.cache_file`.
    pub fn from_config(config: &Config) -> Result<Self> {
        // Create file-backed storage for the cache document
        let storage = FileStorage::new(config.cache_file.clone());
        let cache = QueryCache::new(config.cache_config(), storage)?;
        Ok(Self::new(cache))
    }
}

/// Handler for POST /lookup
///
/// A miss is a normal 200 response with `hit: false`.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<LookupResponse>> {
    // Exact match first, then the fuzzy scan
    let outcome = state.cache.lookup(&req.query).await?;
    Ok(Json(LookupResponse::from(outcome)))
}

/// Handler for PUT /store
pub async fn store_handler(
    State(state): State<AppState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<StoreResponse>> {
    // Overwrites any entry already stored under this query
    state.cache.store(&req.query, req.value).await?;
    Ok(Json(StoreResponse::new(req.query)))
}

/// Handler for DELETE /cache
pub async fn invalidate_all_handler(
    State(state): State<AppState>,
) -> Result<Json<InvalidateResponse>> {
    let removed = state.cache.invalidate(None).await?;
    Ok(Json(InvalidateResponse::new(removed)))
}

/// Handler for DELETE /cache/:query
///
/// Removing a query that is not cached is not an error.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    // Path extraction has already percent-decoded the query
    let removed = state.cache.invalidate(Some(&query)).await?;
    Ok(Json(InvalidateResponse::new(removed)))
}

/// Handler for GET /status
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusReport> {
    Json(state.cache.status().await)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
