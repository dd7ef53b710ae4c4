//! Ticker symbol to CIK resolution.
//!
//! The SEC publishes a single table of every ticker with its CIK and entity
//! title. It is fetched once per run and held in memory; lookups never touch
//! the network.

use crate::edgar::cik::Cik;
use crate::edgar::fetcher::Fetcher;
use crate::error::{DataError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Separator all share-class variants collapse to.
const CLASS_SEPARATOR: char = '.';

/// One row of the ticker table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerEntry {
    /// Ticker as published
    pub ticker: String,
    /// Company CIK
    pub cik: Cik,
    /// Entity title
    pub title: String,
}

/// Parsed ticker table, keyed by normalized symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerTable {
    entries: HashMap<String, TickerEntry>,
}

#[derive(Debug, Deserialize)]
struct RawTicker {
    cik_str: RawCik,
    ticker: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCik {
    Number(u64),
    Text(String),
}

impl TickerTable {
    /// Parse the `company_tickers.json` payload.
    ///
    /// Rows with an unusable CIK are skipped. When several rows share a
    /// symbol the numerically highest CIK is kept, being the most recently
    /// registered entity.
    pub fn parse_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, RawTicker> = serde_json::from_str(json)
            .map_err(|e| DataError::Parse(format!("Failed to parse ticker table: {}", e)))?;

        let mut table = Self::default();
        for row in raw.into_values() {
            let cik = match row.cik_str {
                RawCik::Number(n) => Cik::from_number(n),
                RawCik::Text(s) => Cik::parse(&s),
            };
            match cik {
                Ok(cik) => table.insert(TickerEntry {
                    ticker: row.ticker,
                    cik,
                    title: row.title,
                }),
                Err(e) => debug!(ticker = %row.ticker, error = %e, "skipping ticker row"),
            }
        }

        Ok(table)
    }

    /// Add an entry, keeping the highest CIK on symbol conflicts.
    pub fn insert(&mut self, entry: TickerEntry) {
        let key = normalize_symbol(&entry.ticker);
        if key.is_empty() {
            return;
        }
        match self.entries.get(&key) {
            Some(existing) if existing.cik.number() >= entry.cik.number() => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }

    /// Look up a symbol, trying the base symbol when a share-class variant
    /// is not listed.
    pub fn lookup(&self, symbol: &str) -> Option<&TickerEntry> {
        let key = normalize_symbol(symbol);
        self.entries.get(&key).or_else(|| {
            key.split_once(CLASS_SEPARATOR)
                .and_then(|(base, _)| self.entries.get(base))
        })
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical form of a ticker: trimmed, uppercased, with `/`, `-` and
/// spaces between parts folded to `.`.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol
        .trim()
        .split(|c: char| matches!(c, '.' | '/' | '-') || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join(".")
}

/// Resolves trading symbols to CIKs for the length of a run.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    table: TickerTable,
}

impl Resolver {
    /// Wrap an already loaded table.
    pub const fn new(table: TickerTable) -> Self {
        Self { table }
    }

    /// Fetch the ticker table (through the cache) and build a resolver.
    pub async fn load(fetcher: &Fetcher) -> Result<Self> {
        let table = fetcher.fetch_ticker_table().await?;
        info!(symbols = table.len(), "loaded ticker table");
        Ok(Self::new(table))
    }

    /// Resolve a symbol to its CIK.
    pub fn resolve(&self, symbol: &str) -> Result<Cik> {
        self.table
            .lookup(symbol)
            .map(|entry| entry.cik.clone())
            .ok_or_else(|| DataError::NotFound {
                symbol: symbol.trim().to_string(),
            })
    }

    /// Entity title for a symbol, if listed.
    pub fn name_for(&self, symbol: &str) -> Option<&str> {
        self.table.lookup(symbol).map(|entry| entry.title.as_str())
    }

    /// Underlying table.
    pub const fn table(&self) -> &TickerTable {
        &self.table
    }
}
