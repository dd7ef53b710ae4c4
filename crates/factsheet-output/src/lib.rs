#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factsheet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod summary;

pub use export::{
    ExclusionRow, ExportError, ExportFormat, Exporter, MetricsRow, ProvenanceRow, Record,
    exclusion_rows, metrics_rows, provenance_rows,
};
pub use report::RunReport;
pub use summary::{RunSummary, golden_preview};
