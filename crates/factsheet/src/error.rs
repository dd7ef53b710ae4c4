//! Error types for running an extraction campaign.

use factsheet_data::DataError;
use factsheet_metrics::MetricsError;
use factsheet_output::ExportError;
use thiserror::Error;

/// Result type for campaign operations.
pub type Result<T> = std::result::Result<T, CampaignError>;

/// Errors that abort a run. Per-company failures never surface here; they
/// become exclusion records instead.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// Roster has no usable rows
    #[error("Roster is empty: {0}")]
    EmptyRoster(String),

    /// Roster could not be read from its source
    #[error("Cannot load roster from {source_name}: {message}")]
    RosterSource {
        /// Path or URL
        source_name: String,
        /// Underlying failure
        message: String,
    },

    /// Invalid run configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data layer error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Metric catalog error
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Output error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
