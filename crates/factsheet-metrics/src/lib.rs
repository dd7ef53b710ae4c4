#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factsheet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod extract;
pub mod metric;
pub mod normalize;
pub mod provenance;
pub mod ratio;
pub mod select;

pub use error::{MetricsError, Result};
pub use extract::{
    CompanyMetrics, CompanyOutcome, ExclusionReason, ExclusionRecord, Extractor, MetricResult,
};
pub use metric::{Metric, MetricCatalog, MetricSpec, TagRule};
pub use normalize::{CurrencyFlag, Normalized, normalize, to_millions};
pub use provenance::{ProvenanceLog, ProvenanceRecord};
pub use ratio::compute_ratio;
pub use select::{SelectedFact, Selection, reporting_currency, select};
