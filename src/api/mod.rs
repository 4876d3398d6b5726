//! API Module
//!
//! HTTP handlers and routing for the query cache service.
//!
//! # Endpoints
//! - `POST /lookup` - Exact, then fuzzy lookup of a query
//! - `PUT /store` - Cache a result for a query
//! - `DELETE /cache` - Invalidate every entry
//! - `DELETE /cache/:query` - Invalidate one exact query
//! - `GET /status` - Per-entry diagnostics
//! - `GET /stats` - Runtime counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
