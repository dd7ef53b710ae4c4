//! SQLite caching layer for EDGAR documents.

use crate::cache::DocumentCache;
use crate::edgar::Cik;
use crate::error::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// SQLite cache for raw documents and resolved CIK mappings.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open (or create) the cache database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                cached_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS company_ciks (
                symbol TEXT PRIMARY KEY,
                cik TEXT NOT NULL,
                company_name TEXT,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    /// CIK remembered for a normalized symbol.
    pub fn get_cik(&self, symbol: &str) -> Result<Option<Cik>> {
        let result: Option<String> = self
            .conn
            .query_row(
                "SELECT cik FROM company_ciks WHERE symbol = ?1",
                params![symbol],
                |row| row.get(0),
            )
            .optional()?;

        result.map(|raw| Cik::parse(&raw)).transpose()
    }

    /// Remember the CIK for a normalized symbol.
    pub fn put_cik(&self, symbol: &str, cik: &Cik, company_name: Option<&str>) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR REPLACE INTO company_ciks (symbol, cik, company_name, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![symbol, cik.as_str(), company_name, updated_at],
        )?;

        Ok(())
    }

    /// Delete every document and mapping.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM documents", [])?;
        self.conn.execute("DELETE FROM company_ciks", [])?;
        Ok(())
    }

    /// Counts of cached documents and mappings.
    pub fn get_stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            documents: self.count("SELECT COUNT(*) FROM documents")? as usize,
            company_facts: self
                .count("SELECT COUNT(*) FROM documents WHERE key LIKE 'companyfacts/%'")?
                as usize,
            total_bytes: self.count("SELECT COALESCE(SUM(LENGTH(body)), 0) FROM documents")?,
            cik_mappings: self.count("SELECT COUNT(*) FROM company_ciks")? as usize,
        })
    }
}

impl DocumentCache for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(result)
    }

    fn put(&self, key: &str, body: &str) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR REPLACE INTO documents (key, body, cached_at)
             VALUES (?1, ?2, ?3)",
            params![key, body, cached_at],
        )?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM documents WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.count("SELECT COUNT(*) FROM documents")? as usize)
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of cached documents
    pub documents: usize,
    /// Number of cached company-facts documents
    pub company_facts: usize,
    /// Total size of cached bodies in bytes
    pub total_bytes: u64,
    /// Number of CIK mappings
    pub cik_mappings: usize,
}
