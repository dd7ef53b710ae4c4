//! SEC EDGAR access.
//!
//! This module provides:
//! - CIK identifiers and ticker-table resolution
//! - A retrying, cache-first fetcher for company-facts documents
//! - The parsed company-facts document model
//!
//! # Example
//!
//! ```no_run
//! use factsheet_data::cache::MemoryCache;
//! use factsheet_data::edgar::{EdgarClient, Fetcher, FetcherConfig, Resolver};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = Fetcher::new(
//!         Arc::new(EdgarClient::new()?),
//!         Box::new(MemoryCache::new()),
//!         FetcherConfig::default(),
//!     );
//!
//!     let resolver = Resolver::load(&fetcher).await?;
//!     let cik = resolver.resolve("AAPL")?;
//!     let doc = fetcher.fetch_company_facts(&cik).await?;
//!     for fact in doc.facts_for("us-gaap:Revenues") {
//!         println!("Revenues FY{:?}: {:?} {}", fact.fiscal_year, fact.value, fact.unit);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cik;
pub mod client;
pub mod facts;
pub mod fetcher;
pub mod resolver;
pub mod retry;

// Re-export main types
pub use cik::Cik;
pub use client::{
    COMPANY_TICKERS_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, EDGAR_BASE_URL, EdgarClient,
    HttpResponse, Transport,
};
pub use facts::{
    FactInstance, FactValue, FactsDocument, FiscalPeriod, UnitDimension, concepts, currency_of,
};
pub use fetcher::{FetchStats, Fetcher, FetcherConfig, TICKER_TABLE_KEY, company_facts_key};
pub use resolver::{Resolver, TickerEntry, TickerTable, normalize_symbol};
pub use retry::{Backoff, RetryConfig, duration_secs};
