//! Full JSON report of a run.

use crate::export::{ExportError, ExportFormat, Exporter};
use chrono::{DateTime, Utc};
use factsheet_metrics::{CompanyMetrics, ExclusionRecord, ProvenanceRecord};
use serde::{Deserialize, Serialize};

/// Every result of a run in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Target fiscal year.
    pub fiscal_year: i32,

    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// Extracted companies.
    pub companies: Vec<CompanyMetrics>,

    /// Excluded companies.
    pub exclusions: Vec<ExclusionRecord>,

    /// Provenance of every selected fact.
    pub provenance: Vec<ProvenanceRecord>,
}

impl RunReport {
    /// Create a new report stamped with the current time.
    pub fn new(
        fiscal_year: i32,
        companies: Vec<CompanyMetrics>,
        exclusions: Vec<ExclusionRecord>,
        provenance: Vec<ProvenanceRecord>,
    ) -> Self {
        Self {
            fiscal_year,
            generated_at: Utc::now(),
            companies,
            exclusions,
            provenance,
        }
    }
}

impl Exporter for RunReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::Csv => Err(ExportError::InvalidFormat(
                "a run report is nested; export it as JSON".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factsheet_metrics::ExclusionReason;

    #[test]
    fn test_report_json() {
        let report = RunReport::new(
            2023,
            vec![],
            vec![ExclusionRecord::new(
                "ZZZZ",
                "",
                None,
                ExclusionReason::Unresolved,
                "no mapping",
            )],
            vec![],
        );

        let json = report.export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("\"fiscal_year\": 2023"));
        assert!(json.contains("\"UNRESOLVED\""));

        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.exclusions.len(), 1);

        let compact = report.export_to_string(ExportFormat::Json).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_report_has_no_csv_form() {
        let report = RunReport::new(2023, vec![], vec![], vec![]);
        assert!(matches!(
            report.export_to_string(ExportFormat::Csv),
            Err(ExportError::InvalidFormat(_))
        ));
    }
}
