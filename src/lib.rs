//! FAQ Cache - persistent query result cache with fuzzy lookup
//!
//! Sits in front of a slow retrieval call: answers repeated or reworded
//! questions from a bounded, TTL-limited store persisted as one JSON document.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{Lookup, QueryCache};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
pub use storage::{CacheStorage, FileStorage, MemoryStorage};
pub use tasks::spawn_cleanup_task;
