//! Cache-first document fetching with bounded retries and request pacing.

use crate::cache::DocumentCache;
use crate::edgar::cik::Cik;
use crate::edgar::client::{COMPANY_TICKERS_URL, EDGAR_BASE_URL, HttpResponse, Transport};
use crate::edgar::facts::FactsDocument;
use crate::edgar::resolver::TickerTable;
use crate::edgar::retry::RetryConfig;
use crate::error::{DataError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Cache key of the ticker table.
pub const TICKER_TABLE_KEY: &str = "mappings/company_tickers";

/// Cache key of a company-facts document.
pub fn company_facts_key(cik: &Cik) -> String {
    format!("companyfacts/CIK{}", cik)
}

/// Settings that shape how the [`Fetcher`] talks to EDGAR.
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    /// Base URL of the data API, without trailing slash
    pub data_base_url: String,
    /// URL of the ticker table
    pub tickers_url: String,
    /// Retry policy for transient failures
    pub retry: RetryConfig,
    /// Pause after every live request sequence
    pub request_delay: Duration,
    /// When false, cache reads are skipped and fresh bodies overwrite entries
    pub use_cache: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            data_base_url: EDGAR_BASE_URL.to_string(),
            tickers_url: COMPANY_TICKERS_URL.to_string(),
            retry: RetryConfig::default(),
            request_delay: Duration::from_secs(1),
            use_cache: true,
        }
    }
}

impl FetcherConfig {
    /// Company-facts URL for a CIK.
    pub fn company_facts_url(&self, cik: &Cik) -> String {
        format!(
            "{}/api/xbrl/companyfacts/CIK{}.json",
            self.data_base_url.trim_end_matches('/'),
            cik
        )
    }
}

/// Counters describing where documents came from during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Documents served from the cache
    pub cache_hits: usize,
    /// Live request sequences issued (one per document, retries included)
    pub live_fetches: usize,
    /// Individual HTTP attempts
    pub attempts: usize,
    /// Live sequences that ended in an error
    pub failures: usize,
}

#[derive(Debug, Default)]
struct Counters {
    cache_hits: AtomicUsize,
    live_fetches: AtomicUsize,
    attempts: AtomicUsize,
    failures: AtomicUsize,
}

/// Retrieves documents through a [`DocumentCache`] and a [`Transport`].
#[derive(Debug)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    cache: Box<dyn DocumentCache>,
    config: FetcherConfig,
    counters: Counters,
}

impl Fetcher {
    /// Create a fetcher over the given transport and cache.
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Box<dyn DocumentCache>,
        config: FetcherConfig,
    ) -> Self {
        Self {
            transport,
            cache,
            config,
            counters: Counters::default(),
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Backing cache.
    pub fn cache(&self) -> &dyn DocumentCache {
        self.cache.as_ref()
    }

    /// Snapshot of the fetch counters.
    pub fn stats(&self) -> FetchStats {
        FetchStats {
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            live_fetches: self.counters.live_fetches.load(Ordering::Relaxed),
            attempts: self.counters.attempts.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Fetch the company-facts document for a CIK.
    ///
    /// Cache hits return immediately. Misses go to the network, are parsed,
    /// and only then written back; a body that does not parse is reported as
    /// a fetch failure and never cached.
    pub async fn fetch_company_facts(&self, cik: &Cik) -> Result<FactsDocument> {
        let key = company_facts_key(cik);
        let url = self.config.company_facts_url(cik);
        self.fetch_parsed(&key, &url, FactsDocument::parse_json)
            .await
    }

    /// Fetch the SEC ticker table.
    pub async fn fetch_ticker_table(&self) -> Result<TickerTable> {
        let url = self.config.tickers_url.clone();
        self.fetch_parsed(TICKER_TABLE_KEY, &url, TickerTable::parse_json)
            .await
    }

    async fn fetch_parsed<T>(
        &self,
        key: &str,
        url: &str,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<T> {
        if self.config.use_cache {
            if let Some(body) = self.read_cache(key) {
                match parse(&body) {
                    Ok(parsed) => {
                        debug!(key, "cache hit");
                        self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                        return Ok(parsed);
                    }
                    Err(e) => warn!(key, error = %e, "discarding unreadable cache entry"),
                }
            }
        }

        let response = self.fetch_live(url).await?;
        let parsed = parse(&response.body).map_err(|e| {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
            debug!(url, error = %e, "response body did not parse");
            DataError::Fetch {
                url: url.to_string(),
                attempts: 1,
                status: Some(response.status),
                message: "malformed document".to_string(),
            }
        })?;

        if let Err(e) = self.cache.put(key, &response.body) {
            warn!(key, error = %e, "failed to write cache entry");
        }

        Ok(parsed)
    }

    fn read_cache(&self, key: &str) -> Option<String> {
        match self.cache.get(key) {
            Ok(body) => body,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, fetching live");
                None
            }
        }
    }

    /// One live request sequence, followed by the inter-request delay
    /// whatever the outcome.
    async fn fetch_live(&self, url: &str) -> Result<HttpResponse> {
        self.counters.live_fetches.fetch_add(1, Ordering::Relaxed);
        let result = self.get_with_retry(url).await;
        if result.is_err() {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
        }

        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }

        result
    }

    async fn get_with_retry(&self, url: &str) -> Result<HttpResponse> {
        let retry = &self.config.retry;
        let max_attempts = retry.attempts();
        let mut last_status = None;
        let mut last_message = String::new();

        for attempt in 1..=max_attempts {
            self.counters.attempts.fetch_add(1, Ordering::Relaxed);
            debug!(url, attempt, "GET");

            let transient = match self.transport.get(url).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => {
                    last_status = Some(response.status);
                    last_message = format!("HTTP {}", response.status);
                    retry.should_retry_status(response.status)
                }
                Err(DataError::Transport { message, retryable }) => {
                    last_message = message;
                    retryable
                }
                Err(other) => return Err(other),
            };

            if !transient {
                return Err(DataError::Fetch {
                    url: url.to_string(),
                    attempts: attempt,
                    status: last_status,
                    message: last_message,
                });
            }

            if attempt < max_attempts {
                let delay = retry.delay_for_retry(attempt - 1);
                warn!(
                    url,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    reason = %last_message,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(DataError::Fetch {
            url: url.to_string(),
            attempts: max_attempts,
            status: last_status,
            message: last_message,
        })
    }
}
