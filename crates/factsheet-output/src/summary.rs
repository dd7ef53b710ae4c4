//! Run summary and golden-set preview.

use factsheet_metrics::{CompanyMetrics, ExclusionReason, ExclusionRecord, Metric};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counts describing a finished run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    /// Target fiscal year.
    pub fiscal_year: i32,

    /// Roster rows considered after filtering, resume and limit.
    pub considered: usize,

    /// Companies with metric rows.
    pub extracted: usize,

    /// Extracted companies missing at least one metric.
    pub partial: usize,

    /// Excluded for reporting in a non-USD currency.
    pub non_usd: usize,

    /// Excluded because the symbol had no CIK.
    pub unresolved: usize,

    /// Excluded because the document held no facts.
    pub no_data: usize,

    /// Excluded because the fetch failed.
    pub fetch_failed: usize,
}

impl RunSummary {
    /// Tally extraction results.
    pub fn from_results(
        fiscal_year: i32,
        considered: usize,
        companies: &[CompanyMetrics],
        exclusions: &[ExclusionRecord],
    ) -> Self {
        let count = |reason: ExclusionReason| exclusions.iter().filter(|e| e.reason == reason).count();

        Self {
            fiscal_year,
            considered,
            extracted: companies.len(),
            partial: companies.iter().filter(|c| c.is_partial()).count(),
            non_usd: count(ExclusionReason::NonUsd),
            unresolved: count(ExclusionReason::Unresolved),
            no_data: count(ExclusionReason::NoData),
            fetch_failed: count(ExclusionReason::FetchFailed),
        }
    }

    /// Total excluded companies.
    pub const fn excluded(&self) -> usize {
        self.non_usd + self.unresolved + self.no_data + self.fetch_failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "FY{}: processed {} | extracted {} ({} partial) | excluded {}",
            self.fiscal_year,
            self.considered,
            self.extracted,
            self.partial,
            self.excluded()
        )?;
        write!(
            f,
            "  NON_USD {} | UNRESOLVED {} | NO_DATA {} | FETCH_FAILED {}",
            self.non_usd, self.unresolved, self.no_data, self.fetch_failed
        )
    }
}

fn cell(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

/// Fixed-width table of the companies whose symbol is in `symbols`.
pub fn golden_preview(companies: &[CompanyMetrics], symbols: &[&str], fiscal_year: i32) -> String {
    let mut output = String::new();
    output.push_str(&format!("\nGolden set preview (FY{fiscal_year})\n"));
    output.push_str(&"=".repeat(100));
    output.push('\n');
    output.push_str(&format!(
        "{:<8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>10} {:>8}\n",
        "Symbol", "Revenue", "NetIncome", "Liabilities", "Equity", "CFO", "L/E", "Partial"
    ));
    output.push_str(&"-".repeat(100));
    output.push('\n');

    let selected = companies.iter().filter(|c| {
        symbols
            .iter()
            .any(|s| s.eq_ignore_ascii_case(c.symbol.trim()))
    });

    for company in selected {
        output.push_str(&format!(
            "{:<8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>10} {:>8}\n",
            company.symbol,
            cell(company.value(Metric::Revenue), 2),
            cell(company.value(Metric::NetIncome), 2),
            cell(company.value(Metric::TotalLiabilities), 2),
            cell(company.value(Metric::ShareholdersEquity), 2),
            cell(company.value(Metric::OperatingCashFlow), 2),
            cell(company.liabilities_to_equity, 3),
            company.is_partial(),
        ));
    }

    output.push_str(&"=".repeat(100));
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use factsheet_data::edgar::Cik;

    fn company(symbol: &str) -> CompanyMetrics {
        CompanyMetrics {
            symbol: symbol.to_string(),
            name: String::new(),
            identifier: Cik::parse("1").unwrap(),
            fiscal_year: 2023,
            reporting_currency: None,
            results: vec![],
            liabilities_to_equity: Some(1.23456),
        }
    }

    #[test]
    fn test_summary_counts() {
        let exclusions = vec![
            ExclusionRecord::new("A", "", None, ExclusionReason::Unresolved, ""),
            ExclusionRecord::new("B", "", None, ExclusionReason::NonUsd, ""),
            ExclusionRecord::new("C", "", None, ExclusionReason::NonUsd, ""),
        ];
        let summary = RunSummary::from_results(2023, 5, &[company("AAPL"), company("X")], &exclusions);

        assert_eq!(summary.extracted, 2);
        assert_eq!(summary.partial, 2);
        assert_eq!(summary.non_usd, 2);
        assert_eq!(summary.excluded(), 3);
        assert!(summary.to_string().contains("NON_USD 2"));
    }

    #[test]
    fn test_golden_preview_filters_symbols() {
        let preview = golden_preview(&[company("AAPL"), company("ZZZ")], &["aapl", "MSFT"], 2023);
        assert!(preview.contains("FY2023"));
        assert!(preview.contains("AAPL"));
        assert!(!preview.contains("ZZZ"));
        assert!(preview.contains("1.235"));
    }
}
