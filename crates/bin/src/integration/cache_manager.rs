//! Cache manager for EDGAR documents.
//!
//! Opens the SQLite document cache at a platform-specific default location
//! unless the run config names one.

use factsheet::RunConfig;
use factsheet::data::DataError;
use factsheet::data::cache::SqliteCache;
use std::path::PathBuf;

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/factsheet/`
/// - macOS: `~/Library/Caches/factsheet/`
/// - Windows: `%LOCALAPPDATA%\factsheet\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("factsheet")
}

/// Get the default cache database path.
pub(crate) fn default_cache_path() -> PathBuf {
    default_cache_dir().join("factsheet.db")
}

/// Cache path for a run: the configured one, else the default.
pub(crate) fn cache_path(config: &RunConfig) -> PathBuf {
    config.cache_path.clone().unwrap_or_else(default_cache_path)
}

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache(config: &RunConfig) -> Result<SqliteCache, DataError> {
    let cache_path = cache_path(config);

    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteCache::new(&cache_path)
}
