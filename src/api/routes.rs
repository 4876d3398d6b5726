//! API Routes
//!
//! Configures the Axum router with all cache service endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, invalidate_all_handler, invalidate_handler, lookup_handler, stats_handler,
    status_handler, store_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /lookup` - Exact then fuzzy lookup of a query
/// - `PUT /store` - Cache a result set under a query
/// - `DELETE /cache` - Drop every entry
/// - `DELETE /cache/:query` - Drop one exact query
/// - `GET /status` - Live entries and their hit counts
/// - `GET /stats` - Runtime hit/miss counters
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/lookup", post(lookup_handler))
        .route("/store", put(store_handler))
        .route("/cache", delete(invalidate_all_handler))
        .route("/cache/:query", delete(invalidate_handler))
        .route("/status", get(status_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
