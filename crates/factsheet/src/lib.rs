#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factsheet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod campaign;
pub mod config;
pub mod error;
pub mod roster;

// Re-export main types from sub-crates
pub use factsheet_data as data;
pub use factsheet_metrics as metrics;
pub use factsheet_output as output;

pub use campaign::{Campaign, CampaignEvent, CampaignOptions, CampaignResults, OutputFiles};
pub use config::{DEFAULT_FISCAL_YEAR, DEFAULT_ROSTER, RunConfig};
pub use error::{CampaignError, Result};
pub use roster::{CompanyRecord, GOLDEN_SET, Roster};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
