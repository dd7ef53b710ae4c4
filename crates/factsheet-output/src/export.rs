//! Export functionality for extraction results.
//!
//! This module provides CSV and JSON export for the three tables a run
//! produces: per-company metrics, per-fact provenance and exclusions.

use chrono::NaiveDate;
use factsheet_metrics::{
    CompanyMetrics, ExclusionReason, ExclusionRecord, Metric, ProvenanceRecord,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// A flat record with a fixed column layout.
pub trait Record: Serialize {
    /// Column names, in serialization order.
    const COLUMNS: &'static [&'static str];
}

/// One row of the metrics table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsRow {
    /// Company symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Zero-padded CIK.
    pub identifier: String,
    /// Target fiscal year.
    pub fiscal_year: i32,
    /// Accession of the representative filing.
    pub filing_accession: Option<String>,
    /// Date of the representative filing.
    pub filing_date: Option<NaiveDate>,
    /// Form of the representative filing.
    pub source_form: Option<String>,
    /// Revenue, millions of USD.
    pub revenue_musd: Option<f64>,
    /// Net income, millions of USD.
    pub net_income_musd: Option<f64>,
    /// Total liabilities, millions of USD.
    pub total_liabilities_musd: Option<f64>,
    /// Shareholders' equity, millions of USD.
    pub total_shareholders_equity_musd: Option<f64>,
    /// Operating cash flow, millions of USD.
    pub cfo_musd: Option<f64>,
    /// Total liabilities over shareholders' equity.
    pub liabilities_to_shareholders_equity_ratio: Option<f64>,
    /// At least one metric is missing.
    pub partial_data: bool,
    /// Tag used for revenue.
    pub tag_used_revenue: Option<String>,
    /// Tag used for net income.
    pub tag_used_net_income: Option<String>,
    /// Tag used for total liabilities.
    pub tag_used_total_liabilities: Option<String>,
    /// Tag used for shareholders' equity.
    pub tag_used_total_shareholders_equity: Option<String>,
    /// Tag used for operating cash flow.
    pub tag_used_cfo: Option<String>,
}

impl Record for MetricsRow {
    const COLUMNS: &'static [&'static str] = &[
        "symbol",
        "name",
        "identifier",
        "fiscal_year",
        "filing_accession",
        "filing_date",
        "source_form",
        "revenue_musd",
        "net_income_musd",
        "total_liabilities_musd",
        "total_shareholders_equity_musd",
        "cfo_musd",
        "liabilities_to_shareholders_equity_ratio",
        "partial_data",
        "tag_used_revenue",
        "tag_used_net_income",
        "tag_used_total_liabilities",
        "tag_used_total_shareholders_equity",
        "tag_used_cfo",
    ];
}

impl From<&CompanyMetrics> for MetricsRow {
    fn from(company: &CompanyMetrics) -> Self {
        let primary = company.primary_filing();
        let tag = |metric| company.tag_used(metric).map(str::to_string);

        Self {
            symbol: company.symbol.clone(),
            name: company.name.clone(),
            identifier: company.identifier.to_string(),
            fiscal_year: company.fiscal_year,
            filing_accession: primary.and_then(|p| p.accession.clone()),
            filing_date: primary.and_then(|p| p.filed),
            source_form: primary.and_then(|p| p.form.clone()),
            revenue_musd: company.value(Metric::Revenue),
            net_income_musd: company.value(Metric::NetIncome),
            total_liabilities_musd: company.value(Metric::TotalLiabilities),
            total_shareholders_equity_musd: company.value(Metric::ShareholdersEquity),
            cfo_musd: company.value(Metric::OperatingCashFlow),
            liabilities_to_shareholders_equity_ratio: company.liabilities_to_equity,
            partial_data: company.is_partial(),
            tag_used_revenue: tag(Metric::Revenue),
            tag_used_net_income: tag(Metric::NetIncome),
            tag_used_total_liabilities: tag(Metric::TotalLiabilities),
            tag_used_total_shareholders_equity: tag(Metric::ShareholdersEquity),
            tag_used_cfo: tag(Metric::OperatingCashFlow),
        }
    }
}

/// One row of the provenance table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvenanceRow {
    /// Company symbol.
    pub symbol: String,
    /// Zero-padded CIK.
    pub identifier: String,
    /// Metric key.
    pub metric: Metric,
    /// Concept tag.
    pub tag: String,
    /// Reported unit.
    pub unit: String,
    /// Raw reported value.
    pub value: f64,
    /// Value in millions of USD.
    pub value_musd: Option<f64>,
    /// Accession number.
    pub accession: Option<String>,
    /// Filing date.
    pub filed: Option<NaiveDate>,
    /// Form type.
    pub form: Option<String>,
    /// Fiscal year of the fact.
    pub fiscal_year: Option<i32>,
    /// Reported fiscal period code.
    pub fiscal_period: Option<String>,
    /// SEC frame.
    pub frame: Option<String>,
    /// Selected through an approximate tag.
    pub approximate: bool,
    /// Rule note.
    pub note: Option<String>,
}

impl Record for ProvenanceRow {
    const COLUMNS: &'static [&'static str] = &[
        "symbol",
        "identifier",
        "metric",
        "tag",
        "unit",
        "value",
        "value_musd",
        "accession",
        "filed",
        "form",
        "fiscal_year",
        "fiscal_period",
        "frame",
        "approximate",
        "note",
    ];
}

impl From<&ProvenanceRecord> for ProvenanceRow {
    fn from(record: &ProvenanceRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            identifier: record.identifier.to_string(),
            metric: record.metric,
            tag: record.tag.clone(),
            unit: record.unit.clone(),
            value: record.value,
            value_musd: record.value_musd,
            accession: record.accession.clone(),
            filed: record.filed,
            form: record.form.clone(),
            fiscal_year: record.fiscal_year,
            fiscal_period: record.fiscal_period.clone(),
            frame: record.frame.clone(),
            approximate: record.approximate,
            note: record.note.clone(),
        }
    }
}

/// One row of the exclusions table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExclusionRow {
    /// Company symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Zero-padded CIK, blank when unresolved.
    pub identifier: Option<String>,
    /// Reason code.
    pub reason: ExclusionReason,
    /// Free-text detail.
    pub detail: String,
}

impl Record for ExclusionRow {
    const COLUMNS: &'static [&'static str] = &["symbol", "name", "identifier", "reason", "detail"];
}

impl From<&ExclusionRecord> for ExclusionRow {
    fn from(record: &ExclusionRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            name: record.name.clone(),
            identifier: record.identifier.as_ref().map(ToString::to_string),
            reason: record.reason,
            detail: record.detail.clone(),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl<T: Record> Exporter for Vec<T> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(vec![]);
                // headers are written even when there are no rows
                wtr.write_record(T::COLUMNS)?;
                for record in self {
                    wtr.serialize(record)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Metrics rows for a set of companies, in input order.
pub fn metrics_rows<'a>(companies: impl IntoIterator<Item = &'a CompanyMetrics>) -> Vec<MetricsRow> {
    companies.into_iter().map(MetricsRow::from).collect()
}

/// Provenance rows for a set of records, in input order.
pub fn provenance_rows<'a>(
    records: impl IntoIterator<Item = &'a ProvenanceRecord>,
) -> Vec<ProvenanceRow> {
    records.into_iter().map(ProvenanceRow::from).collect()
}

/// Exclusion rows for a set of records, in input order.
pub fn exclusion_rows<'a>(
    records: impl IntoIterator<Item = &'a ExclusionRecord>,
) -> Vec<ExclusionRow> {
    records.into_iter().map(ExclusionRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use factsheet_data::edgar::Cik;

    fn exclusion() -> ExclusionRow {
        ExclusionRow {
            symbol: "SHEL".to_string(),
            name: "Shell plc".to_string(),
            identifier: Some("0001306965".to_string()),
            reason: ExclusionReason::NonUsd,
            detail: "reporting currency EUR".to_string(),
        }
    }

    #[test]
    fn test_exclusion_export_csv() {
        let unresolved = ExclusionRow {
            symbol: "ZZZZ".to_string(),
            name: String::new(),
            identifier: None,
            reason: ExclusionReason::Unresolved,
            detail: "No CIK mapping for symbol: ZZZZ".to_string(),
        };

        let csv = vec![exclusion(), unresolved]
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "symbol,name,identifier,reason,detail");
        assert_eq!(lines[1], "SHEL,Shell plc,0001306965,NON_USD,reporting currency EUR");
        assert!(lines[2].starts_with("ZZZZ,,,UNRESOLVED,"));
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let csv = Vec::<MetricsRow>::new()
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        assert_eq!(csv.trim_end(), MetricsRow::COLUMNS.join(","));
    }

    #[test]
    fn test_exclusion_export_json() {
        let json = vec![exclusion()]
            .export_to_string(ExportFormat::Json)
            .unwrap();
        assert!(json.contains("\"NON_USD\""));
        assert!(json.contains("\"SHEL\""));

        let pretty = vec![exclusion()]
            .export_to_string(ExportFormat::PrettyJson)
            .unwrap();
        assert!(pretty.contains("  ")); // Indentation indicates pretty format
    }

    #[test]
    fn test_exclusion_row_from_record() {
        let record = ExclusionRecord::new(
            "XOM",
            "Exxon Mobil",
            Some(Cik::parse("34088").unwrap()),
            ExclusionReason::FetchFailed,
            "HTTP 503",
        );
        let row = ExclusionRow::from(&record);
        assert_eq!(row.identifier.as_deref(), Some("0000034088"));
        assert_eq!(row.reason, ExclusionReason::FetchFailed);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
