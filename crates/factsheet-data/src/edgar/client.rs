//! HTTP transport for the SEC EDGAR APIs.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Duration;

/// SEC EDGAR data API base URL
pub const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// Ticker → CIK table (note: hosted at www.sec.gov, not data.sec.gov)
pub const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// User agent for SEC EDGAR requests (SEC requires identifying information)
pub const DEFAULT_USER_AGENT: &str = "factsheet/0.1 (contact@example.com)";

/// Hard per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A body-less response with the given status.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    /// Returns true for 2xx statuses.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// A single-shot GET transport. Retries and pacing live in the fetcher.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Issue one GET request.
    ///
    /// Non-2xx statuses are returned as responses, not errors. Errors are
    /// reserved for failures where no response arrived.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// reqwest-backed transport with the headers the SEC asks for.
#[derive(Debug, Clone)]
pub struct EdgarClient {
    client: reqwest::Client,
    user_agent: String,
}

impl EdgarClient {
    /// Create a new EDGAR client with the default user agent and timeout
    pub fn new() -> Result<Self> {
        Self::with_user_agent(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    /// Create a new EDGAR client with a custom user agent
    ///
    /// The SEC requires a User-Agent of the form "Company Name contact@email.com".
    ///
    /// # Example
    /// ```no_run
    /// use factsheet_data::edgar::EdgarClient;
    /// use std::time::Duration;
    ///
    /// # fn example() -> factsheet_data::Result<()> {
    /// let client = EdgarClient::with_user_agent("Research Desk research@example.com", Duration::from_secs(30))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .gzip(true)
            .timeout(timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }

    /// The User-Agent sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl Transport for EdgarClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn transport_error(err: reqwest::Error) -> DataError {
    DataError::Transport {
        retryable: err.is_timeout() || err.is_connect() || err.is_request() || err.is_body(),
        message: err.to_string(),
    }
}
