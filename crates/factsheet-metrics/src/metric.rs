//! Target metrics and their tag priority lists.
//!
//! Filers tag the same economic quantity under different concept names, and
//! the same filer may switch names between years. Each metric therefore maps
//! to an ordered list of tags; earlier tags win whenever they have a usable
//! fact for the target year.

use crate::error::{MetricsError, Result};
use factsheet_data::edgar::UnitDimension;
use factsheet_data::edgar::concepts::{balance_sheet, cash_flow, income_statement};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A fiscal-year figure the extraction produces per company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Total revenue
    Revenue,
    /// Net income attributable to the company
    NetIncome,
    /// Total liabilities
    TotalLiabilities,
    /// Total shareholders' equity
    #[serde(rename = "total_shareholders_equity")]
    ShareholdersEquity,
    /// Net cash from operating activities
    #[serde(rename = "cfo")]
    OperatingCashFlow,
}

impl Metric {
    /// Every metric, in output column order.
    pub const ALL: [Self; 5] = [
        Self::Revenue,
        Self::NetIncome,
        Self::TotalLiabilities,
        Self::ShareholdersEquity,
        Self::OperatingCashFlow,
    ];

    /// Stable machine name used in file columns and config.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::NetIncome => "net_income",
            Self::TotalLiabilities => "total_liabilities",
            Self::ShareholdersEquity => "total_shareholders_equity",
            Self::OperatingCashFlow => "cfo",
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::NetIncome => "Net Income",
            Self::TotalLiabilities => "Total Liabilities",
            Self::ShareholdersEquity => "Shareholders' Equity",
            Self::OperatingCashFlow => "Operating Cash Flow",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One entry in a metric's tag priority list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    /// Concept tag including taxonomy (e.g., "us-gaap:Revenues")
    pub tag: String,

    /// Note attached to values selected through this tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// The tag only approximates the metric
    #[serde(default)]
    pub approximate: bool,
}

impl TagRule {
    /// An exact tag without notes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            note: None,
            approximate: false,
        }
    }

    /// An exact tag whose values carry an explanatory note.
    pub fn noted(tag: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::new(tag)
        }
    }

    /// A fallback tag that only approximates the metric.
    pub fn approximate(tag: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            approximate: true,
            ..Self::noted(tag, note)
        }
    }
}

const fn monetary() -> UnitDimension {
    UnitDimension::Monetary
}

/// How to find one metric in a facts document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Metric produced
    pub metric: Metric,

    /// Unit dimension a candidate fact must have
    #[serde(default = "monetary")]
    pub dimension: UnitDimension,

    /// Tags to try, highest priority first
    pub rules: Vec<TagRule>,
}

impl MetricSpec {
    /// A monetary metric with the given rules.
    pub fn monetary(metric: Metric, rules: Vec<TagRule>) -> Self {
        Self {
            metric,
            dimension: UnitDimension::Monetary,
            rules,
        }
    }

    /// Default tag priority list for a metric.
    pub fn default_for(metric: Metric) -> Self {
        let rules = match metric {
            Metric::Revenue => vec![
                TagRule::new(income_statement::REVENUES),
                TagRule::new(income_statement::SALES_REVENUE_NET),
                TagRule::new(income_statement::REVENUE_FROM_CONTRACT),
                TagRule::new(income_statement::SALES_REVENUE_GOODS),
                TagRule::new(income_statement::SALES_REVENUE_SERVICES),
            ],
            Metric::NetIncome => vec![
                TagRule::new(income_statement::NET_INCOME),
                TagRule::new(income_statement::PROFIT_LOSS),
                TagRule::new(income_statement::NET_INCOME_TO_COMMON),
            ],
            Metric::TotalLiabilities => vec![
                TagRule::new(balance_sheet::LIABILITIES),
                TagRule::approximate(
                    balance_sheet::LIABILITIES_AND_EQUITY,
                    "LiabilitiesAndStockholdersEquity used (broader than liabilities only)",
                ),
                TagRule::approximate(
                    balance_sheet::CURRENT_LIABILITIES,
                    "Only current liabilities available (partial)",
                ),
            ],
            Metric::ShareholdersEquity => vec![
                TagRule::new(balance_sheet::STOCKHOLDERS_EQUITY),
                TagRule::noted(
                    balance_sheet::EQUITY_ATTRIBUTABLE_TO_PARENT,
                    "Equity attributable to parent.",
                ),
                TagRule::new(balance_sheet::MEMBERS_EQUITY),
                TagRule::new(balance_sheet::PARTNERS_CAPITAL),
                TagRule::noted(
                    balance_sheet::EQUITY_INCLUDING_NCI,
                    "Includes noncontrolling interests (NCI).",
                ),
            ],
            Metric::OperatingCashFlow => vec![
                TagRule::new(cash_flow::OPERATING_CASH_FLOW),
                TagRule::new(cash_flow::OPERATING_CASH_FLOW_CONTINUING),
                TagRule::new(cash_flow::OPERATING_CASH_FLOW_INDIRECT),
            ],
        };
        Self::monetary(metric, rules)
    }
}

/// The full set of metric specs used by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricCatalog {
    specs: Vec<MetricSpec>,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self {
            specs: Metric::ALL.into_iter().map(MetricSpec::default_for).collect(),
        }
    }
}

impl MetricCatalog {
    /// Build a catalog from explicit specs.
    ///
    /// Metrics missing from `specs` fall back to their default rules, so a
    /// config file only needs to list the metrics it overrides.
    pub fn new(specs: Vec<MetricSpec>) -> Result<Self> {
        let catalog = Self { specs }.with_defaults();
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a JSON array of metric specs.
    pub fn from_json(json: &str) -> Result<Self> {
        let specs: Vec<MetricSpec> = serde_json::from_str(json)?;
        Self::new(specs)
    }

    /// Fill in default specs for metrics that have none, and order specs
    /// the way output columns are ordered.
    pub fn with_defaults(mut self) -> Self {
        for metric in Metric::ALL {
            if self.get(metric).is_none() {
                self.specs.push(MetricSpec::default_for(metric));
            }
        }
        self.specs.sort_by_key(|spec| spec.metric);
        self
    }

    /// Check for duplicate metrics and empty or blank tag lists.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for spec in &self.specs {
            if !seen.insert(spec.metric) {
                return Err(MetricsError::Catalog(format!(
                    "metric {} listed more than once",
                    spec.metric
                )));
            }
            if spec.rules.is_empty() {
                return Err(MetricsError::Catalog(format!(
                    "metric {} has no tags",
                    spec.metric
                )));
            }
            if spec.rules.iter().any(|rule| rule.tag.trim().is_empty()) {
                return Err(MetricsError::Catalog(format!(
                    "metric {} has a blank tag",
                    spec.metric
                )));
            }
        }
        Ok(())
    }

    /// Spec for a metric.
    pub fn get(&self, metric: Metric) -> Option<&MetricSpec> {
        self.specs.iter().find(|spec| spec.metric == metric)
    }

    /// All specs, in column order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricSpec> {
        self.specs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_catalog_covers_every_metric() {
        let catalog = MetricCatalog::default();
        assert!(catalog.validate().is_ok());
        let metrics: Vec<Metric> = catalog.iter().map(|spec| spec.metric).collect();
        assert_eq!(metrics, Metric::ALL.to_vec());
    }

    #[test]
    fn test_liabilities_fallbacks_are_approximate() {
        let spec = MetricSpec::default_for(Metric::TotalLiabilities);
        assert_eq!(spec.rules[0].tag, "us-gaap:Liabilities");
        assert!(!spec.rules[0].approximate);
        assert!(spec.rules[1].approximate);
        assert!(spec.rules[2].approximate);
        assert_eq!(
            spec.rules[2].note.as_deref(),
            Some("Only current liabilities available (partial)")
        );
    }

    #[rstest]
    #[case(Metric::Revenue, "revenue")]
    #[case(Metric::ShareholdersEquity, "total_shareholders_equity")]
    #[case(Metric::OperatingCashFlow, "cfo")]
    fn test_metric_keys_match_serde(#[case] metric: Metric, #[case] key: &str) {
        assert_eq!(metric.key(), key);
        assert_eq!(serde_json::to_string(&metric).unwrap(), format!("\"{key}\""));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let json = r#"[
            {"metric": "revenue", "rules": [{"tag": "us-gaap:SalesRevenueNet"}]}
        ]"#;
        let catalog = MetricCatalog::from_json(json).unwrap();

        let revenue = catalog.get(Metric::Revenue).unwrap();
        assert_eq!(revenue.rules.len(), 1);
        assert_eq!(revenue.dimension, UnitDimension::Monetary);
        assert_eq!(
            catalog.get(Metric::NetIncome),
            Some(&MetricSpec::default_for(Metric::NetIncome))
        );
        assert_eq!(catalog.iter().count(), 5);
    }

    #[test]
    fn test_invalid_catalogs_rejected() {
        let duplicate = r#"[
            {"metric": "cfo", "rules": [{"tag": "a:B"}]},
            {"metric": "cfo", "rules": [{"tag": "a:C"}]}
        ]"#;
        assert!(matches!(
            MetricCatalog::from_json(duplicate),
            Err(MetricsError::Catalog(_))
        ));

        let empty = r#"[{"metric": "cfo", "rules": []}]"#;
        assert!(matches!(
            MetricCatalog::from_json(empty),
            Err(MetricsError::Catalog(_))
        ));

        assert!(matches!(
            MetricCatalog::from_json("{"),
            Err(MetricsError::Serialization(_))
        ));
    }

    #[test]
    fn test_catalog_serializes_as_list() {
        let json = serde_json::to_string(&MetricCatalog::default()).unwrap();
        assert!(json.starts_with('['));
        let back: MetricCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MetricCatalog::default());
    }
}
