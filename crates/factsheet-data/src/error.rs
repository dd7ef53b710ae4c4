//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error raised while building or driving the HTTP client
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A single transport attempt failed before a response arrived
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure
        message: String,
        /// Whether the failure is transient (timeout, connection reset)
        retryable: bool,
    },

    /// Fetch failed after exhausting retries, on a non-retryable status,
    /// or because the response body could not be parsed
    #[error("Fetch failed for {url} after {attempts} attempt(s){}: {message}", last_status(.status))]
    Fetch {
        /// Requested URL
        url: String,
        /// Number of attempts made
        attempts: u32,
        /// Last HTTP status seen, if any response arrived
        status: Option<u16>,
        /// Description of the last failure
        message: String,
    },

    /// Symbol has no identifier mapping
    #[error("No CIK mapping for symbol: {symbol}")]
    NotFound {
        /// Symbol that was looked up
        symbol: String,
    },

    /// Identifier could not be parsed
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn last_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (last status {s})")).unwrap_or_default()
}

impl DataError {
    /// Last HTTP status carried by a fetch failure.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true for failures that only affect a single company and
    /// should not abort a run.
    pub const fn is_per_company(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. }
                | Self::Transport { .. }
                | Self::Network(_)
                | Self::NotFound { .. }
                | Self::InvalidIdentifier(_)
                | Self::Parse(_)
                | Self::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_with_status() {
        let err = DataError::Fetch {
            url: "https://data.sec.gov/x".to_string(),
            attempts: 5,
            status: Some(429),
            message: "rate limited".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("after 5 attempt(s)"));
        assert!(msg.contains("last status 429"));
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_fetch_error_display_without_status() {
        let err = DataError::Fetch {
            url: "https://data.sec.gov/x".to_string(),
            attempts: 1,
            status: None,
            message: "timed out".to_string(),
        };
        assert!(!err.to_string().contains("last status"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_per_company_classification() {
        assert!(
            DataError::NotFound {
                symbol: "ZZZZ".to_string()
            }
            .is_per_company()
        );
        assert!(!DataError::Cache("locked".to_string()).is_per_company());
    }
}
