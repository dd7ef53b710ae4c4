//! Per-company extraction: select, gate on currency, normalize, record.

use crate::metric::{Metric, MetricCatalog};
use crate::normalize::{BASE_CURRENCY, CurrencyFlag, normalize};
use crate::provenance::{ProvenanceLog, ProvenanceRecord};
use crate::ratio::compute_ratio;
use crate::select::{Selection, reporting_currency, select};
use factsheet_data::edgar::{Cik, FactsDocument, currency_of};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Why a company produced no metric rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExclusionReason {
    /// Reports in a currency other than USD
    NonUsd,
    /// Symbol has no CIK mapping
    Unresolved,
    /// Facts document holds no facts
    NoData,
    /// Document could not be fetched
    FetchFailed,
}

impl ExclusionReason {
    /// Reason code written to output files.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NonUsd => "NON_USD",
            Self::Unresolved => "UNRESOLVED",
            Self::NoData => "NO_DATA",
            Self::FetchFailed => "FETCH_FAILED",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A company left out of the metrics output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRecord {
    /// Company symbol
    pub symbol: String,
    /// Company name
    pub name: String,
    /// CIK, when it was known
    pub identifier: Option<Cik>,
    /// Reason code
    pub reason: ExclusionReason,
    /// Free-text detail
    pub detail: String,
}

impl ExclusionRecord {
    /// Create an exclusion record.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        identifier: Option<Cik>,
        reason: ExclusionReason,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            identifier,
            reason,
            detail: detail.into(),
        }
    }
}

/// One metric value for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Company symbol
    pub symbol: String,
    /// Company CIK
    pub identifier: Cik,
    /// Metric
    pub metric: Metric,
    /// Value in millions of USD, `None` when missing
    pub value_musd: Option<f64>,
    /// Note on how the value was obtained or why it is missing
    pub unit_note: Option<String>,
    /// Source of the value
    pub provenance: Option<ProvenanceRecord>,
}

impl MetricResult {
    /// Tag the value was selected from.
    pub fn tag(&self) -> Option<&str> {
        self.provenance.as_ref().map(|p| p.tag.as_str())
    }
}

/// All metrics extracted for a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetrics {
    /// Company symbol
    pub symbol: String,
    /// Company name
    pub name: String,
    /// Company CIK
    pub identifier: Cik,
    /// Target fiscal year
    pub fiscal_year: i32,
    /// Currency the gate decided on, when known
    pub reporting_currency: Option<String>,
    /// One result per metric, in column order
    pub results: Vec<MetricResult>,
    /// Total liabilities over shareholders' equity
    pub liabilities_to_equity: Option<f64>,
}

impl CompanyMetrics {
    /// Result for a metric.
    pub fn result(&self, metric: Metric) -> Option<&MetricResult> {
        self.results.iter().find(|r| r.metric == metric)
    }

    /// Value for a metric in millions of USD.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.result(metric).and_then(|r| r.value_musd)
    }

    /// Tag a metric was selected from.
    pub fn tag_used(&self, metric: Metric) -> Option<&str> {
        self.result(metric).and_then(MetricResult::tag)
    }

    /// Returns true when any metric is missing.
    pub fn is_partial(&self) -> bool {
        Metric::ALL.iter().any(|m| self.value(*m).is_none())
    }

    /// Filing that represents the company in summary columns: the first
    /// found of net income, revenue, liabilities, equity and cash flow.
    pub fn primary_filing(&self) -> Option<&ProvenanceRecord> {
        [
            Metric::NetIncome,
            Metric::Revenue,
            Metric::TotalLiabilities,
            Metric::ShareholdersEquity,
            Metric::OperatingCashFlow,
        ]
        .into_iter()
        .find_map(|m| self.result(m).and_then(|r| r.provenance.as_ref()))
    }
}

/// Result of processing one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompanyOutcome {
    /// Metrics were extracted (possibly partially)
    Extracted(CompanyMetrics),
    /// Company was excluded
    Excluded(ExclusionRecord),
}

/// Applies a metric catalog to facts documents for one fiscal year.
#[derive(Debug, Clone)]
pub struct Extractor {
    catalog: MetricCatalog,
    fiscal_year: i32,
}

impl Extractor {
    /// Create an extractor.
    pub const fn new(catalog: MetricCatalog, fiscal_year: i32) -> Self {
        Self {
            catalog,
            fiscal_year,
        }
    }

    /// Target fiscal year.
    pub const fn fiscal_year(&self) -> i32 {
        self.fiscal_year
    }

    /// Catalog in use.
    pub const fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Extract every metric for one company.
    ///
    /// A company whose known reporting currency is not USD is excluded as a
    /// whole and leaves nothing in the provenance log. Unknown currency is
    /// treated as USD.
    pub fn extract(
        &self,
        symbol: &str,
        name: &str,
        identifier: &Cik,
        document: &FactsDocument,
        log: &mut ProvenanceLog,
    ) -> CompanyOutcome {
        let name = if name.trim().is_empty() {
            document.entity_name.clone().unwrap_or_default()
        } else {
            name.to_string()
        };

        if document.is_empty() {
            return CompanyOutcome::Excluded(ExclusionRecord::new(
                symbol,
                name,
                Some(identifier.clone()),
                ExclusionReason::NoData,
                "company-facts document has no facts",
            ));
        }

        let selections: Vec<(Metric, Selection)> = self
            .catalog
            .iter()
            .map(|spec| (spec.metric, select(document, spec, self.fiscal_year)))
            .collect();

        let currency =
            reporting_currency(document).or_else(|| selected_currency(&selections));

        if let Some(code) = currency.as_deref()
            && code != BASE_CURRENCY
        {
            return CompanyOutcome::Excluded(ExclusionRecord::new(
                symbol,
                name,
                Some(identifier.clone()),
                ExclusionReason::NonUsd,
                format!("reporting currency {code}"),
            ));
        }

        let results = selections
            .into_iter()
            .map(|(metric, selection)| {
                self.metric_result(symbol, identifier, metric, &selection, log)
            })
            .collect::<Vec<_>>();

        let mut company = CompanyMetrics {
            symbol: symbol.to_string(),
            name,
            identifier: identifier.clone(),
            fiscal_year: self.fiscal_year,
            reporting_currency: currency,
            results,
            liabilities_to_equity: None,
        };
        company.liabilities_to_equity = compute_ratio(
            company.value(Metric::TotalLiabilities),
            company.value(Metric::ShareholdersEquity),
        );

        CompanyOutcome::Extracted(company)
    }

    fn metric_result(
        &self,
        symbol: &str,
        identifier: &Cik,
        metric: Metric,
        selection: &Selection,
        log: &mut ProvenanceLog,
    ) -> MetricResult {
        let mut result = MetricResult {
            symbol: symbol.to_string(),
            identifier: identifier.clone(),
            metric,
            value_musd: None,
            unit_note: None,
            provenance: None,
        };

        let Some(selected) = selection.found() else {
            debug!(symbol, %metric, fiscal_year = self.fiscal_year, "no annual fact");
            return result;
        };

        let normalized = normalize(&selected.fact);
        match normalized.currency {
            CurrencyFlag::Usd => {
                debug!(symbol, %metric, tag = %selected.rule.tag, "selected");
                result.value_musd = normalized.value_musd;
                result.unit_note = selected.rule.note.clone();
                result.provenance =
                    Some(log.record(symbol, identifier, metric, selected).clone());
            }
            CurrencyFlag::NonUsd(code) => {
                result.unit_note = Some(format!("reported in {code}; not converted"));
            }
            CurrencyFlag::Unknown => {
                result.unit_note = Some(format!("unit {} is not a currency", selected.fact.unit));
            }
        }
        result
    }
}

/// Currency of the selected Revenue fact, else of the first monetary fact
/// selected in catalog order.
fn selected_currency(selections: &[(Metric, Selection)]) -> Option<String> {
    let unit_currency = |selection: &Selection| {
        selection
            .found()
            .and_then(|selected| currency_of(&selected.fact.unit))
    };
    selections
        .iter()
        .filter(|(metric, _)| *metric == Metric::Revenue)
        .chain(selections.iter().filter(|(metric, _)| *metric != Metric::Revenue))
        .find_map(|(_, selection)| unit_currency(selection))
}
