//! Caching layer for fetched EDGAR documents.
//!
//! Documents are cached as raw response bodies keyed by a string such as
//! `companyfacts/CIK0000320193`. The data is assumed static for the length
//! of an extraction campaign, so entries never expire; callers that want
//! fresh data bypass the cache and overwrite.

pub mod sqlite;

pub use sqlite::{CacheStats, SqliteCache};

use crate::error::{DataError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Key/value store for raw documents.
///
/// Access is sequential within a run; implementations are not required to
/// coordinate concurrent writers.
pub trait DocumentCache: std::fmt::Debug {
    /// Fetch a cached body, `None` on a miss.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store or replace a body.
    fn put(&self, key: &str, body: &str) -> Result<()>;

    /// Drop an entry if present.
    fn remove(&self, key: &str) -> Result<()>;

    /// Number of cached documents.
    fn len(&self) -> Result<usize>;

    /// Returns true when nothing is cached.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory cache, used by tests and `--no-cache` dry runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| DataError::Cache("memory cache lock poisoned".to_string()))
    }
}

impl DocumentCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn put(&self, key: &str, body: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), body.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}
