//! Company-facts documents from the SEC XBRL JSON API.
//!
//! The SEC serves every XBRL fact a company has ever filed at:
//! `https://data.sec.gov/api/xbrl/companyfacts/CIK{cik_padded}.json`
//!
//! The payload is nested as `facts → taxonomy → concept → units → unit → [fact]`.
//! [`FactsDocument`] flattens that into a map from concept tag
//! (`"us-gaap:Revenues"`) to the ordered list of [`FactInstance`]s reported
//! under it. Both the tag map and the per-tag unit maps are ordered, so
//! iterating a document always yields the same sequence for the same input.
//!
//! # Example
//!
//! ```
//! use factsheet_data::edgar::facts::FactsDocument;
//!
//! let json = r#"{
//!     "cik": 320193,
//!     "entityName": "Apple Inc.",
//!     "facts": {"us-gaap": {"Revenues": {"units": {"USD": [
//!         {"start": "2022-09-25", "end": "2023-09-30", "val": 383285000000,
//!          "accn": "0000320193-23-000106", "fy": 2023, "fp": "FY",
//!          "form": "10-K", "filed": "2023-11-03"}
//!     ]}}}}
//! }"#;
//!
//! let doc = FactsDocument::parse_json(json).unwrap();
//! assert_eq!(doc.facts_for("us-gaap:Revenues").len(), 1);
//! ```

use crate::error::{DataError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum span, in days, of a duration fact that covers a full fiscal year.
///
/// 52/53-week fiscal calendars produce 364 or 371 day spans.
pub const ANNUAL_MIN_DAYS: i64 = 340;

/// Maximum span, in days, of a duration fact that covers a full fiscal year.
pub const ANNUAL_MAX_DAYS: i64 = 380;

/// Whether a fact covers a full fiscal year or a partial period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalPeriod {
    /// Full fiscal year
    Annual,
    /// Anything shorter than a year (quarters, half-years, YTD slices)
    Quarterly,
}

impl FiscalPeriod {
    /// Classify a fact from its reported `fp` code and its period span.
    ///
    /// A fact is annual only when the filer tagged it `FY` and it is either
    /// an instant (balance-sheet) fact or spans a full year. 10-K filings tag
    /// their fourth-quarter slices `FY` as well, which the span check rejects.
    pub fn classify(fp: Option<&str>, duration_days: Option<i64>) -> Self {
        let tagged_fy = fp.is_some_and(|fp| fp.trim().eq_ignore_ascii_case("FY"));
        let full_span = duration_days
            .is_none_or(|days| (ANNUAL_MIN_DAYS..=ANNUAL_MAX_DAYS).contains(&days));
        if tagged_fy && full_span {
            Self::Annual
        } else {
            Self::Quarterly
        }
    }

    /// Short code used in exports.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Annual => "FY",
            Self::Quarterly => "Q",
        }
    }
}

/// The reported value of a fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// Numeric amount as reported (not scaled)
    Number(f64),
    /// Text value, used by some DEI facts such as currency codes
    Text(String),
}

impl FactValue {
    /// Numeric value, if this fact is numeric.
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Text value, if this fact is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

/// Physical dimension of a reported unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitDimension {
    /// A currency amount (`USD`, `EUR`, ...)
    Monetary,
    /// Currency per share (`USD/shares`)
    PerShare,
    /// Share counts
    Shares,
    /// Dimensionless ratios
    Pure,
    /// Anything else
    Other,
}

impl UnitDimension {
    /// Classify an SEC unit string.
    pub fn of(unit: &str) -> Self {
        let unit = unit.trim();
        let lower = unit.to_ascii_lowercase();
        if lower.contains("/shares") || lower.contains("-per-share") || lower.contains("/share") {
            Self::PerShare
        } else if lower == "shares" {
            Self::Shares
        } else if lower == "pure" {
            Self::Pure
        } else if unit.len() == 3 && unit.chars().all(|c| c.is_ascii_alphabetic()) {
            Self::Monetary
        } else {
            Self::Other
        }
    }
}

/// Currency code of a monetary unit, uppercased.
pub fn currency_of(unit: &str) -> Option<String> {
    (UnitDimension::of(unit) == UnitDimension::Monetary).then(|| unit.trim().to_ascii_uppercase())
}

/// A single reported fact instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactInstance {
    /// Concept tag including taxonomy (e.g., "us-gaap:NetIncomeLoss")
    pub tag: String,

    /// Unit of measure (e.g., "USD", "USD/shares")
    pub unit: String,

    /// Reported value
    pub value: FactValue,

    /// Fiscal year the fact describes: the year of the period end, falling
    /// back to the filing's `fy` when no end date was reported
    pub fiscal_year: Option<i32>,

    /// Fiscal year of the filing that carried the fact (`fy`)
    pub reported_fiscal_year: Option<i32>,

    /// Annual or partial period
    pub fiscal_period: FiscalPeriod,

    /// Raw fiscal period code (`FY`, `Q1`, ...)
    pub reported_period: Option<String>,

    /// Form type (e.g., "10-K", "10-Q")
    pub form_type: Option<String>,

    /// Date the carrying filing was accepted
    pub filed_date: Option<NaiveDate>,

    /// Accession number of the carrying filing
    pub accession_id: Option<String>,

    /// Start of the reporting period (None for instant facts)
    pub period_start: Option<NaiveDate>,

    /// End of the reporting period
    pub period_end: Option<NaiveDate>,

    /// SEC frame assignment (e.g., "CY2023")
    pub frame: Option<String>,
}

impl FactInstance {
    /// Returns the duration in days if this is a duration fact
    pub fn duration_days(&self) -> Option<i64> {
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => Some(end.signed_duration_since(start).num_days()),
            _ => None,
        }
    }

    /// Returns true when the carrying form is an annual report
    /// (`10-K`, `10-K/A`, `10-KT`, ...).
    pub fn is_annual_report(&self) -> bool {
        self.form_type
            .as_deref()
            .is_some_and(|form| form.trim().to_ascii_uppercase().starts_with("10-K"))
    }

    /// Numeric value of the fact.
    pub const fn numeric_value(&self) -> Option<f64> {
        self.value.as_f64()
    }
}

/// All facts a company has reported, keyed by concept tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactsDocument {
    /// CIK as reported by the API
    pub cik: Option<String>,

    /// Company name as reported by the API
    pub entity_name: Option<String>,

    /// Fact instances per concept tag, in document order
    pub concepts: BTreeMap<String, Vec<FactInstance>>,
}

impl FactsDocument {
    /// Creates a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the SEC company-facts JSON format.
    ///
    /// Dates that fail to parse are kept as `None`; a body that is not a
    /// company-facts payload at all is an error.
    pub fn parse_json(json: &str) -> Result<Self> {
        let response: CompanyFactsResponse = serde_json::from_str(json)
            .map_err(|e| DataError::Parse(format!("Failed to parse company facts: {}", e)))?;

        let mut concepts: BTreeMap<String, Vec<FactInstance>> = BTreeMap::new();

        for (taxonomy, taxonomy_facts) in response.facts {
            for (concept_name, concept_data) in taxonomy_facts {
                let tag = format!("{}:{}", taxonomy, concept_name);
                let instances = concepts.entry(tag.clone()).or_default();

                for (unit, unit_facts) in concept_data.units {
                    for raw in unit_facts {
                        instances.push(raw.into_instance(&tag, &unit));
                    }
                }
            }
        }

        concepts.retain(|_, instances| !instances.is_empty());

        Ok(Self {
            cik: response.cik.map(|c| c.into_string()),
            entity_name: response.entity_name,
            concepts,
        })
    }

    /// Add a fact, keeping document order within its tag.
    pub fn push(&mut self, fact: FactInstance) {
        self.concepts.entry(fact.tag.clone()).or_default().push(fact);
    }

    /// All facts reported under a tag, in document order.
    pub fn facts_for(&self, tag: &str) -> &[FactInstance] {
        self.concepts.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// All concept tags present, sorted.
    pub fn concept_tags(&self) -> impl Iterator<Item = &str> {
        self.concepts.keys().map(String::as_str)
    }

    /// Total number of fact instances.
    pub fn fact_count(&self) -> usize {
        self.concepts.values().map(Vec::len).sum()
    }

    /// Returns true if the document holds no facts.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

// SEC API JSON structure
// Based on: https://www.sec.gov/edgar/sec-api-documentation

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyFactsResponse {
    #[serde(default)]
    cik: Option<NumberOrText>,
    #[serde(default)]
    entity_name: Option<String>,
    facts: BTreeMap<String, BTreeMap<String, ConceptData>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

impl NumberOrText {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConceptData {
    #[serde(default)]
    units: BTreeMap<String, Vec<FactData>>,
}

#[derive(Debug, Deserialize)]
struct FactData {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    val: FactValue,
    #[serde(default)]
    accn: Option<String>,
    #[serde(default)]
    fy: Option<i32>,
    #[serde(default)]
    fp: Option<String>,
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    filed: Option<String>,
    #[serde(default)]
    frame: Option<String>,
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

impl FactData {
    fn into_instance(self, tag: &str, unit: &str) -> FactInstance {
        let period_start = parse_date(self.start.as_deref());
        let period_end = parse_date(self.end.as_deref());
        let duration_days = period_start
            .zip(period_end)
            .map(|(start, end)| end.signed_duration_since(start).num_days());

        FactInstance {
            tag: tag.to_string(),
            unit: unit.to_string(),
            value: self.val,
            fiscal_year: period_end.map(|end| end.year()).or(self.fy),
            reported_fiscal_year: self.fy,
            fiscal_period: FiscalPeriod::classify(self.fp.as_deref(), duration_days),
            reported_period: self.fp,
            form_type: self.form,
            filed_date: parse_date(self.filed.as_deref()),
            accession_id: self.accn,
            period_start,
            period_end,
            frame: self.frame,
        }
    }
}

/// Concept tags referenced by the default metric catalogue.
pub mod concepts {
    /// Balance Sheet concepts
    pub mod balance_sheet {
        /// Total Liabilities
        pub const LIABILITIES: &str = "us-gaap:Liabilities";

        /// Liabilities and equity total (broader than liabilities)
        pub const LIABILITIES_AND_EQUITY: &str = "us-gaap:LiabilitiesAndStockholdersEquity";

        /// Current Liabilities
        pub const CURRENT_LIABILITIES: &str = "us-gaap:LiabilitiesCurrent";

        /// Stockholders' Equity
        pub const STOCKHOLDERS_EQUITY: &str = "us-gaap:StockholdersEquity";

        /// Equity attributable to parent
        pub const EQUITY_ATTRIBUTABLE_TO_PARENT: &str =
            "us-gaap:StockholdersEquityAttributableToParent";

        /// LLC members' equity
        pub const MEMBERS_EQUITY: &str = "us-gaap:MembersEquity";

        /// Partnership capital
        pub const PARTNERS_CAPITAL: &str = "us-gaap:PartnersCapital";

        /// Equity including noncontrolling interest
        pub const EQUITY_INCLUDING_NCI: &str =
            "us-gaap:StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest";
    }

    /// Income Statement concepts
    pub mod income_statement {
        /// Total Revenue
        pub const REVENUES: &str = "us-gaap:Revenues";

        /// Legacy net sales tag
        pub const SALES_REVENUE_NET: &str = "us-gaap:SalesRevenueNet";

        /// Revenue from Contract with Customer
        pub const REVENUE_FROM_CONTRACT: &str =
            "us-gaap:RevenueFromContractWithCustomerExcludingAssessedTax";

        /// Legacy goods revenue tag
        pub const SALES_REVENUE_GOODS: &str = "us-gaap:SalesRevenueGoodsNet";

        /// Legacy services revenue tag
        pub const SALES_REVENUE_SERVICES: &str = "us-gaap:SalesRevenueServicesNet";

        /// Net Income (Loss)
        pub const NET_INCOME: &str = "us-gaap:NetIncomeLoss";

        /// Profit or loss including noncontrolling interest
        pub const PROFIT_LOSS: &str = "us-gaap:ProfitLoss";

        /// Net income available to common stockholders
        pub const NET_INCOME_TO_COMMON: &str =
            "us-gaap:NetIncomeLossAvailableToCommonStockholdersBasic";
    }

    /// Cash Flow Statement concepts
    pub mod cash_flow {
        /// Operating Cash Flows
        pub const OPERATING_CASH_FLOW: &str = "us-gaap:NetCashProvidedByUsedInOperatingActivities";

        /// Operating cash flows from continuing operations
        pub const OPERATING_CASH_FLOW_CONTINUING: &str =
            "us-gaap:NetCashProvidedByUsedInOperatingActivitiesContinuingOperations";

        /// Operating cash flows, indirect method
        pub const OPERATING_CASH_FLOW_INDIRECT: &str =
            "us-gaap:NetCashProvidedByUsedInOperatingActivitiesIndirectMethod";
    }

    /// Document and Entity Information concepts
    pub mod dei {
        /// ISO code of the reporting currency
        pub const REPORTING_CURRENCY_ISO: &str = "dei:EntityReportingCurrencyISOCode";

        /// ISO code of the common currency
        pub const COMMON_CURRENCY_ISO: &str = "dei:EntityCommonCurrencyISOCode";

        /// Common currency (free text)
        pub const COMMON_CURRENCY: &str = "dei:EntityCommonCurrency";
    }
}
