//! Error types for metric configuration.

use thiserror::Error;

/// Result type for metric operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors raised while loading or validating a metric catalog.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Catalog is structurally invalid
    #[error("Invalid metric catalog: {0}")]
    Catalog(String),

    /// Catalog JSON could not be read
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
