//! Configuration Module
//!
//! Handles loading server and cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

use chrono::Duration;

use crate::cache::{
    DEFAULT_FUZZY_THRESHOLD, DEFAULT_MAX_ENTRIES, DEFAULT_STOPWORDS, DEFAULT_TTL_SECS, MAX_TTL_SECS,
};
use crate::error::{CacheError, Result};

// == Cache Config ==
/// Tuning parameters fixed at cache construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Time to live applied to every entry at write time
    pub ttl: Duration,
    /// Hard cap on live entries
    pub max_entries: usize,
    /// Minimum similarity in `[0, 1]` for a fuzzy hit
    pub fuzzy_threshold: f64,
    /// Words dropped during match-normalization
    pub stopwords: Vec<String>,
}

impl CacheConfig {
    /// Checks that the parameters are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(CacheError::InvalidConfig(format!(
                "fuzzy_threshold must be within [0, 1], got {}",
                self.fuzzy_threshold
            )));
        }
        if self.ttl <= Duration::zero() {
            return Err(CacheError::InvalidConfig("ttl must be positive".to_string()));
        }
        if self.ttl > Duration::seconds(MAX_TTL_SECS as i64) {
            return Err(CacheError::InvalidConfig(format!(
                "ttl must not exceed {} seconds",
                MAX_TTL_SECS
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_TTL_SECS as i64),
            max_entries: DEFAULT_MAX_ENTRIES,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Entry time to live in seconds
    pub ttl_secs: u64,
    /// Maximum number of live entries
    pub max_entries: usize,
    /// Fuzzy match similarity threshold
    pub fuzzy_threshold: f64,
    /// Stopword override; `None` keeps the built-in list
    pub stopwords: Option<Vec<String>>,
    /// Path of the persisted cache document
    pub cache_file: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_SECS` - Entry TTL in seconds (default: 604800, 7 days)
    /// - `CACHE_MAX_ENTRIES` - Maximum live entries (default: 10)
    /// - `CACHE_FUZZY_THRESHOLD` - Fuzzy similarity threshold (default: 0.8)
    /// - `CACHE_STOPWORDS` - Comma separated stopword list (default: built-in list)
    /// - `CACHE_FILE` - Cache document path (default: data/query_cache.json)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_secs: parse_var("CACHE_TTL_SECS").unwrap_or(defaults.ttl_secs),
            max_entries: parse_var("CACHE_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            fuzzy_threshold: parse_var("CACHE_FUZZY_THRESHOLD").unwrap_or(defaults.fuzzy_threshold),
            stopwords: env::var("CACHE_STOPWORDS").ok().map(|v| split_list(&v)),
            cache_file: env::var("CACHE_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_file),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Builds the cache tuning parameters.
    ///
    /// TTL is capped at `MAX_TTL_SECS`.
    pub fn cache_config(&self) -> CacheConfig {
        let defaults = CacheConfig::default();
        CacheConfig {
            ttl: Duration::seconds(self.ttl_secs.min(MAX_TTL_SECS) as i64),
            max_entries: self.max_entries,
            fuzzy_threshold: self.fuzzy_threshold,
            stopwords: self.stopwords.clone().unwrap_or(defaults.stopwords),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            stopwords: None,
            cache_file: PathBuf::from("data/query_cache.json"),
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
