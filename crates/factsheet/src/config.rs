//! Run configuration.
//!
//! Everything a run needs is in [`RunConfig`]. Values come from defaults,
//! optionally overlaid by a JSON file, and finally by command-line flags.

use crate::error::{CampaignError, Result};
use factsheet_data::edgar::{
    COMPANY_TICKERS_URL, DEFAULT_USER_AGENT, EDGAR_BASE_URL, FetcherConfig, RetryConfig,
    duration_secs,
};
use factsheet_metrics::MetricCatalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default fiscal year.
pub const DEFAULT_FISCAL_YEAR: i32 = 2023;

/// Roster read when none is given.
pub const DEFAULT_ROSTER: &str = "sp500_companies.csv";

/// Settings for one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Fiscal year to extract
    pub fiscal_year: i32,

    /// User-Agent sent to the SEC ("Company Name contact@email.com")
    pub user_agent: String,

    /// Pause after each live request
    #[serde(with = "duration_secs")]
    pub request_delay: Duration,

    /// Take a longer pause every this many companies (0 disables)
    pub pause_every: usize,

    /// Length of the periodic pause
    #[serde(with = "duration_secs")]
    pub pause_seconds: Duration,

    /// Retry policy for transient fetch failures
    pub retry: RetryConfig,

    /// Read cached documents. Fresh documents are always written back.
    pub use_cache: bool,

    /// Cache database location, `None` for the platform default
    pub cache_path: Option<PathBuf>,

    /// Directory for output files
    pub output_dir: PathBuf,

    /// Base URL of the data API
    pub data_base_url: String,

    /// URL of the ticker table
    pub tickers_url: String,

    /// Roster CSV path or URL
    pub roster: String,

    /// Only process the golden set
    pub golden_only: bool,

    /// Process at most this many companies
    pub limit: Option<usize>,

    /// Skip companies until this symbol or CIK
    pub resume_from: Option<String>,

    /// Also write the full result set as JSON
    pub write_json: bool,

    /// Tag priority lists per metric
    pub metrics: MetricCatalog,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fiscal_year: DEFAULT_FISCAL_YEAR,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_delay: Duration::from_secs(1),
            pause_every: 100,
            pause_seconds: Duration::from_secs(10),
            retry: RetryConfig::default(),
            use_cache: true,
            cache_path: None,
            output_dir: PathBuf::from("."),
            data_base_url: EDGAR_BASE_URL.to_string(),
            tickers_url: COMPANY_TICKERS_URL.to_string(),
            roster: DEFAULT_ROSTER.to_string(),
            golden_only: false,
            limit: None,
            resume_from: None,
            write_json: false,
            metrics: MetricCatalog::default(),
        }
    }
}

impl RunConfig {
    /// Parse a JSON config. Missing keys keep their defaults and metrics
    /// missing from `metrics` keep their default tag lists.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)
            .map_err(|e| CampaignError::Config(format!("cannot parse config: {e}")))?;
        config.metrics = config.metrics.with_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CampaignError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Check values that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(1990..=2100).contains(&self.fiscal_year) {
            return Err(CampaignError::Config(format!(
                "fiscal year {} out of range",
                self.fiscal_year
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(CampaignError::Config("user agent is empty".to_string()));
        }
        if self.roster.trim().is_empty() {
            return Err(CampaignError::Config("roster source is empty".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(CampaignError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        self.metrics.validate()?;
        Ok(())
    }

    /// Fetcher settings derived from this config.
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            data_base_url: self.data_base_url.clone(),
            tickers_url: self.tickers_url.clone(),
            retry: self.retry.clone(),
            request_delay: self.request_delay,
            use_cache: self.use_cache,
        }
    }

    /// Path of an output file for this run, e.g. `fy2023_metrics.csv`.
    pub fn output_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("fy{}_{stem}.{extension}", self.fiscal_year))
    }
}
